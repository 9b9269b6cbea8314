//! Fused lead records: the output of identity resolution
//!
//! A `FusedLeadRecord` is the single best-evidence view of one property
//! identity, with field-level provenance. Fused leads are always recomputed
//! whole from the current raw-record set, never patched incrementally, so
//! `sources` and `conflicts` stay consistent with the data they describe.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::raw_record::{
    AttributeValue, Contact, ContactMethod, PropertyAddress, RawPropertyRecord,
};

/// One contributing raw record, annotated with its reliability score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub key: String,
    pub url: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub reliability: u32,
}

/// Which candidate value won a contested attribute, and why
///
/// Authoritative wins carry `confidence` (the fixed authoritative trust
/// level); raw-source wins carry `reliability` (the winning source's score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub value: AttributeValue,
    pub source: String,
    pub reliability: Option<u32>,
    pub confidence: Option<f64>,
}

/// Deduplicated contact with aggregated confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedContact {
    pub method: ContactMethod,
    pub value: String,
    /// Aggregated confidence, boosted per corroborating source and capped
    /// below 1.0
    pub confidence: f64,
    /// Every source that independently reported this contact
    pub sources: Vec<String>,
}

/// The fused output for one property identity
///
/// Uniquely identified by `address_hash`; persistence upserts whole records
/// keyed by it. `sources` has one entry per contributing raw record; an
/// authoritative payload is privileged data, not a source, so it adds no
/// entry but does populate `conflicts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedLeadRecord {
    /// Display address, cloned from the most-complete input record
    pub address: PropertyAddress,
    pub address_hash: Option<String>,
    pub owner_name: Option<String>,
    pub parcel_id: Option<String>,
    pub apn: Option<String>,
    /// Automated valuation, authoritative payload only
    pub avm: Option<f64>,
    pub last_event_date: Option<NaiveDate>,
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Deduplicated union of every input record's signals
    pub distress_signals: BTreeSet<String>,
    /// Sorted descending by confidence
    pub contacts: Vec<FusedContact>,
    pub sources: Vec<SourceEntry>,
    pub conflicts: BTreeMap<String, ConflictEntry>,
}

impl FusedLeadRecord {
    /// Fold a single-record fusion result back into a raw record
    ///
    /// Used by the batch processor after authoritative enhancement so the
    /// upgraded record can re-enter hash grouping. Origin metadata comes
    /// from the sole source entry; contacts collapse to their first
    /// contributing source. `avm` has no raw-record field and does not
    /// round-trip.
    pub fn into_raw(self) -> RawPropertyRecord {
        let (source_key, source_url, captured_at) = match self.sources.into_iter().next() {
            Some(entry) => (entry.key, entry.url, entry.captured_at),
            None => (String::new(), None, Utc::now()),
        };

        let contacts = self
            .contacts
            .into_iter()
            .map(|c| Contact {
                method: c.method,
                value: c.value,
                confidence: c.confidence,
                source: c.sources.into_iter().next().unwrap_or_default(),
            })
            .collect();

        RawPropertyRecord {
            address: self.address,
            owner_name: self.owner_name,
            attributes: self.attributes,
            price_hint: None,
            distress_signals: self.distress_signals,
            contacts,
            parcel_id: self.parcel_id,
            apn: self.apn,
            last_event_date: self.last_event_date,
            source_key,
            source_url,
            captured_at,
            address_hash: self.address_hash,
        }
    }
}
