//! Information-density scoring for raw records
//!
//! Ranks candidate records so fusion can pick the richest one as its base.
//! Scores are ranking heuristics only and are never persisted.

use propfuse_common::models::{attr, RawPropertyRecord};

/// Well-known attributes that each contribute one point when present
const SCORED_ATTRIBUTES: &[&str] = &[
    attr::BEDROOMS,
    attr::BATHROOMS,
    attr::SQUARE_FEET,
    attr::YEAR_BUILT,
    attr::LOT_SIZE,
];

/// Weighted sum of presence indicators
///
/// Owner name +2, parcel or APN +2, each well-known attribute +1, price
/// hint +1, last-event date +1, and +2 per contact entry; contact-rich
/// records make the best fusion bases.
pub fn completeness_score(record: &RawPropertyRecord) -> u32 {
    let mut score = 0u32;

    if record.owner_name.is_some() {
        score += 2;
    }
    if record.parcel_id.is_some() || record.apn.is_some() {
        score += 2;
    }
    for key in SCORED_ATTRIBUTES {
        if record.attributes.contains_key(*key) {
            score += 1;
        }
    }
    if record.price_hint.is_some() {
        score += 1;
    }
    if record.last_event_date.is_some() {
        score += 1;
    }
    score += 2 * record.contacts.len() as u32;

    score
}

/// Highest-scoring record in a bucket; ties broken by input order
/// (first-seen wins). `None` on an empty bucket.
pub fn pick_most_complete(records: &[RawPropertyRecord]) -> Option<&RawPropertyRecord> {
    let mut best: Option<(&RawPropertyRecord, u32)> = None;
    for record in records {
        let score = completeness_score(record);
        match best {
            // Strictly-greater keeps the earlier record on ties
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((record, score)),
        }
    }
    best.map(|(record, _)| record)
}
