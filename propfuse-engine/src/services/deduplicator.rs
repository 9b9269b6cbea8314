//! Batch-level identity resolution
//!
//! Groups a batch of raw records by address signature and fuses every
//! bucket. Records without a signature cannot be grouped and pass through
//! unfused; losing data is worse than losing fusion fidelity.

use propfuse_common::models::{FusedLeadRecord, RawPropertyRecord};
use std::collections::HashMap;
use tracing::debug;

use crate::fusion::LeadFuser;

/// Deduplicator
///
/// Output order does not follow input order (grouping discards it); fused
/// buckets are emitted sorted by address hash, followed by un-groupable
/// pass-throughs in input order. Consumers key on `address_hash`.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    fuser: LeadFuser,
}

impl Deduplicator {
    pub fn new(fuser: LeadFuser) -> Self {
        Self { fuser }
    }

    /// Resolve a batch into one fused lead per property identity
    ///
    /// Singleton buckets take the same fusion path as multi-record buckets
    /// so downstream consumers always see a uniform shape.
    pub fn deduplicate(&self, records: Vec<RawPropertyRecord>) -> Vec<FusedLeadRecord> {
        let input_count = records.len();
        let mut buckets: HashMap<String, Vec<RawPropertyRecord>> = HashMap::new();
        let mut ungroupable: Vec<RawPropertyRecord> = Vec::new();

        for record in records {
            match record.address_hash.clone() {
                Some(hash) if !hash.is_empty() => {
                    buckets.entry(hash).or_default().push(record)
                }
                _ => ungroupable.push(record),
            }
        }

        let multi_buckets = buckets.values().filter(|b| b.len() > 1).count();
        debug!(
            input_count,
            buckets = buckets.len(),
            multi_buckets,
            ungroupable = ungroupable.len(),
            "Deduplicating batch"
        );

        let mut ordered: Vec<(String, Vec<RawPropertyRecord>)> = buckets.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut fused: Vec<FusedLeadRecord> = ordered
            .into_iter()
            .map(|(_, bucket)| self.fuser.fuse(None, &bucket))
            .collect();

        fused.extend(
            ungroupable
                .into_iter()
                .map(|record| self.fuser.fuse(None, std::slice::from_ref(&record))),
        );

        fused
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(LeadFuser::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propfuse_common::models::{attr, AttributeValue};
    use std::collections::HashSet;

    fn record(street: &str, hash: Option<&str>, source_key: &str) -> RawPropertyRecord {
        let mut r = RawPropertyRecord::new(street, source_key);
        r.address_hash = hash.map(|h| h.to_string());
        r
    }

    #[test]
    fn test_distinct_hashes_pass_through_as_singletons() {
        let dedup = Deduplicator::default();
        let records = vec![
            record("1 Elm St", Some("hash-a"), "zillow"),
            record("2 Oak St", Some("hash-b"), "redfin"),
            record("3 Pine St", Some("hash-c"), "county-records"),
        ];

        let fused = dedup.deduplicate(records);

        assert_eq!(fused.len(), 3);
        for lead in &fused {
            assert_eq!(lead.sources.len(), 1);
        }
        let hashes: HashSet<_> = fused
            .iter()
            .map(|l| l.address_hash.clone().unwrap())
            .collect();
        assert_eq!(hashes.len(), 3);
    }

    #[test]
    fn test_shared_hash_fuses_into_one_lead() {
        let dedup = Deduplicator::default();
        let mut a = record("123 Main St", Some("hash-main"), "zillow");
        a.attributes
            .insert(attr::BEDROOMS.to_string(), AttributeValue::Number(3.0));
        let mut b = record("123 MAIN STREET", Some("hash-main"), "county-records");
        b.owner_name = Some("Jane Doe".to_string());
        let c = record("9 Side Ave", Some("hash-side"), "redfin");

        let fused = dedup.deduplicate(vec![a, b, c]);

        assert_eq!(fused.len(), 2);
        let merged = fused
            .iter()
            .find(|l| l.address_hash.as_deref() == Some("hash-main"))
            .unwrap();
        assert_eq!(merged.sources.len(), 2);
        assert_eq!(merged.owner_name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            merged.attributes.get(attr::BEDROOMS),
            Some(&AttributeValue::Number(3.0))
        );
    }

    #[test]
    fn test_hashless_records_pass_through_unfused() {
        let dedup = Deduplicator::default();
        let records = vec![
            record("1 Elm St", Some("hash-a"), "zillow"),
            record("", None, "craigslist"),
            record("", None, "craigslist"),
        ];

        let fused = dedup.deduplicate(records);

        // The two un-groupable records are not merged with each other
        assert_eq!(fused.len(), 3);
        let hashless = fused.iter().filter(|l| l.address_hash.is_none()).count();
        assert_eq!(hashless, 2);
    }

    #[test]
    fn test_output_treated_as_set_by_hash() {
        let dedup = Deduplicator::default();
        let records = vec![
            record("2 Oak St", Some("hash-b"), "redfin"),
            record("1 Elm St", Some("hash-a"), "zillow"),
            record("2 Oak St", Some("hash-b"), "zillow"),
        ];

        let fused = dedup.deduplicate(records);

        let by_hash: HashSet<_> = fused
            .iter()
            .map(|l| l.address_hash.clone().unwrap())
            .collect();
        assert_eq!(
            by_hash,
            ["hash-a", "hash-b"].iter().map(|s| s.to_string()).collect()
        );
    }
}
