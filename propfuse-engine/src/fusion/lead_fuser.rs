//! Lead Fuser
//!
//! Performs field-wise fusion of raw property records from multiple sources
//! into a single best-evidence lead record. Resolves conflicts when
//! different sources provide different values.
//!
//! # Fusion Strategy
//! 1. Select the base record by completeness score; its address and hash
//!    are copied verbatim into the output
//! 2. Resolve owner and identifiers (authoritative payload wins)
//! 3. Union distress signals across all records
//! 4. Merge each attribute independently: authoritative value wins
//!    unconditionally, otherwise the highest-reliability source wins
//! 5. Merge contacts grouped by (method, value), boosting confidence per
//!    corroborating source
//!
//! Every contested winner is recorded in the conflict ledger with its
//! source and trust level. The engine never raises on missing fields
//! (absent data skips the corresponding merge step), and an empty input
//! bucket yields a minimal empty record rather than a panic.

use propfuse_common::config::{EngineConfig, FusionSettings};
use propfuse_common::models::{
    AttributeValue, AuthoritativePayload, ConflictEntry, FusedContact, FusedLeadRecord,
    RawPropertyRecord, SourceEntry,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::services::completeness::pick_most_complete;
use crate::services::reliability::SourceReliabilityTable;

/// Conflict-ledger source name for values taken from the authoritative
/// payload
pub const AUTHORITATIVE_SOURCE: &str = "authoritative";

/// Lead Fuser
///
/// Synchronous, pure, and side-effect free: each call is independent, so
/// concurrent fusion across batches needs no coordination.
#[derive(Debug, Clone)]
pub struct LeadFuser {
    settings: FusionSettings,
    reliability: SourceReliabilityTable,
}

impl LeadFuser {
    pub fn new(settings: FusionSettings, reliability: SourceReliabilityTable) -> Self {
        Self {
            settings,
            reliability,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.fusion.clone(),
            SourceReliabilityTable::from_config(config),
        )
    }

    /// Fuse a cluster of raw records (and an optional authoritative
    /// payload) into one lead record
    ///
    /// An empty cluster is a caller contract violation; it returns a
    /// minimal empty record so one bad bucket cannot take down a batch.
    pub fn fuse(
        &self,
        authoritative: Option<&AuthoritativePayload>,
        records: &[RawPropertyRecord],
    ) -> FusedLeadRecord {
        let base = match pick_most_complete(records) {
            Some(base) => base,
            None => {
                warn!("Fusion invoked on empty bucket; returning empty record");
                return FusedLeadRecord::default();
            }
        };

        debug!(
            record_count = records.len(),
            base_source = %base.source_key,
            has_authoritative = authoritative.is_some(),
            "Starting lead fusion"
        );

        let owner_name = authoritative
            .and_then(|p| p.owner_name())
            .or_else(|| base.owner_name.clone());

        // Identifier fields come exclusively from the payload when one is
        // supplied; parcel and last-event fall back to the base record
        // otherwise
        let (parcel_id, apn, avm, last_event_date) = match authoritative {
            Some(payload) => (
                payload.parcel_id(),
                payload.apn(),
                payload.avm(),
                payload.last_event_date(),
            ),
            None => (base.parcel_id.clone(), None, None, base.last_event_date),
        };

        let distress_signals: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.distress_signals.iter().cloned())
            .collect();

        let sources: Vec<SourceEntry> = records
            .iter()
            .map(|r| SourceEntry {
                key: r.source_key.clone(),
                url: r.source_url.clone(),
                captured_at: r.captured_at,
                reliability: self.reliability.score(&r.source_key),
            })
            .collect();

        let (attributes, conflicts) = self.merge_attributes(authoritative, records);
        let contacts = self.merge_contacts(records);

        debug!(
            attributes = attributes.len(),
            conflicts = conflicts.len(),
            contacts = contacts.len(),
            distress_signals = distress_signals.len(),
            "Lead fusion complete"
        );

        FusedLeadRecord {
            address: base.address.clone(),
            address_hash: base.address_hash.clone(),
            owner_name,
            parcel_id,
            apn,
            avm,
            last_event_date,
            attributes,
            distress_signals,
            contacts,
            sources,
            conflicts,
        }
    }

    /// Merge the attribute maps of every record, one attribute at a time
    ///
    /// The conflict ledger gets an entry whenever the authoritative payload
    /// supplied the value, or more than one distinct candidate competed.
    /// A value present identically in every contributing record needs no
    /// resolution and no entry.
    fn merge_attributes(
        &self,
        authoritative: Option<&AuthoritativePayload>,
        records: &[RawPropertyRecord],
    ) -> (
        BTreeMap<String, AttributeValue>,
        BTreeMap<String, ConflictEntry>,
    ) {
        let authoritative_values: BTreeMap<&str, AttributeValue> = authoritative
            .map(|p| p.attributes().into_iter().collect())
            .unwrap_or_default();

        let mut keys: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.attributes.keys().cloned())
            .collect();
        keys.extend(authoritative_values.keys().map(|k| k.to_string()));

        let mut attributes = BTreeMap::new();
        let mut conflicts = BTreeMap::new();

        for key in keys {
            if let Some(value) = authoritative_values.get(key.as_str()) {
                attributes.insert(key.clone(), value.clone());
                conflicts.insert(
                    key,
                    ConflictEntry {
                        value: value.clone(),
                        source: AUTHORITATIVE_SOURCE.to_string(),
                        reliability: None,
                        confidence: Some(self.settings.authoritative_confidence),
                    },
                );
                continue;
            }

            let candidates: Vec<(&AttributeValue, &str, u32)> = records
                .iter()
                .filter_map(|r| {
                    r.attributes.get(&key).map(|value| {
                        (
                            value,
                            r.source_key.as_str(),
                            self.reliability.score(&r.source_key),
                        )
                    })
                })
                .collect();

            let Some(&(first_value, _, _)) = candidates.first() else {
                continue;
            };

            // Strictly-greater keeps the first-seen candidate on ties
            let mut winner = candidates[0];
            for candidate in &candidates[1..] {
                if candidate.2 > winner.2 {
                    winner = *candidate;
                }
            }

            let contested = candidates.iter().any(|(value, _, _)| *value != first_value);
            attributes.insert(key.clone(), winner.0.clone());
            if contested {
                conflicts.insert(
                    key,
                    ConflictEntry {
                        value: winner.0.clone(),
                        source: winner.1.to_string(),
                        reliability: Some(winner.2),
                        confidence: None,
                    },
                );
            }
        }

        (attributes, conflicts)
    }

    /// Flatten, deduplicate, and rank contacts
    ///
    /// Contacts group by (method, value), never value alone: a phone and
    /// an email could coincidentally share one. Each extra source
    /// corroborating the same contact boosts the best reported confidence
    /// by a fixed increment, capped below full certainty: finite evidence
    /// never yields 1.0.
    fn merge_contacts(&self, records: &[RawPropertyRecord]) -> Vec<FusedContact> {
        let mut merged: Vec<FusedContact> = Vec::new();

        for record in records {
            for contact in &record.contacts {
                let existing = merged
                    .iter_mut()
                    .find(|c| c.method == contact.method && c.value == contact.value);
                match existing {
                    Some(fused) => {
                        if fused.confidence < contact.confidence {
                            fused.confidence = contact.confidence;
                        }
                        if !fused.sources.contains(&contact.source) {
                            fused.sources.push(contact.source.clone());
                        }
                    }
                    None => merged.push(FusedContact {
                        method: contact.method,
                        value: contact.value.clone(),
                        confidence: contact.confidence,
                        sources: vec![contact.source.clone()],
                    }),
                }
            }
        }

        for contact in &mut merged {
            let extra_sources = contact.sources.len().saturating_sub(1);
            if extra_sources > 0 {
                let boosted = contact.confidence
                    + self.settings.corroboration_boost * extra_sources as f64;
                contact.confidence = boosted.min(self.settings.contact_confidence_cap);
            }
        }

        merged.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged
    }
}

impl Default for LeadFuser {
    fn default() -> Self {
        Self::new(FusionSettings::default(), SourceReliabilityTable::default())
    }
}
