//! Authoritative property-data payloads
//!
//! A payload is the vendor's nested JSON document for one property
//! (identifier/address/building/lot/assessment/owner/sale structure). It is
//! privileged input to fusion: its values override raw-record disagreement.
//!
//! Vendor field access is data-driven: `ATTRIBUTE_PATHS` maps dotted vendor
//! paths to internal attribute names, resolved by [`value_at_path`]. Keeping
//! the mapping as a table means a vendor schema change touches this file
//! only, never the fusion logic. A missing or unparsable field is "no value
//! available", not an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw_record::{attr, AttributeValue};

/// Vendor dotted path → internal attribute name
pub const ATTRIBUTE_PATHS: &[(&str, &str)] = &[
    ("building.rooms.beds", attr::BEDROOMS),
    ("building.rooms.bathstotal", attr::BATHROOMS),
    ("building.size.universalsize", attr::SQUARE_FEET),
    ("summary.yearbuilt", attr::YEAR_BUILT),
    ("lot.lotsize2", attr::LOT_SIZE),
    ("assessment.market.mkttlvalue", attr::MARKET_VALUE),
];

const OWNER_PATH: &str = "owner.owner1.name";
const PARCEL_PATH: &str = "identifier.attomId";
const APN_PATH: &str = "identifier.apn";
const AVM_PATH: &str = "avm.amount.value";
const LAST_EVENT_PATH: &str = "sale.saleTransDate";

/// Walk a dotted path through nested JSON objects
pub fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// One vendor payload for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthoritativePayload {
    raw: Value,
}

impl AuthoritativePayload {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The underlying vendor document
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn owner_name(&self) -> Option<String> {
        self.string_at(OWNER_PATH)
    }

    /// Vendor property identifier; numeric ids are rendered as strings
    pub fn parcel_id(&self) -> Option<String> {
        match value_at_path(&self.raw, PARCEL_PATH)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn apn(&self) -> Option<String> {
        self.string_at(APN_PATH)
    }

    pub fn avm(&self) -> Option<f64> {
        self.number_at(AVM_PATH)
    }

    /// Last sale/transfer date, ISO "YYYY-MM-DD"
    pub fn last_event_date(&self) -> Option<NaiveDate> {
        let raw = self.string_at(LAST_EVENT_PATH)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
    }

    /// Resolve every mapped attribute present in this payload
    ///
    /// Returned in `ATTRIBUTE_PATHS` order; absent paths are skipped.
    pub fn attributes(&self) -> Vec<(&'static str, AttributeValue)> {
        ATTRIBUTE_PATHS
            .iter()
            .filter_map(|(path, name)| {
                let value = match value_at_path(&self.raw, path)? {
                    Value::Number(n) => AttributeValue::Number(n.as_f64()?),
                    Value::String(s) if !s.trim().is_empty() => {
                        AttributeValue::Text(s.trim().to_string())
                    }
                    _ => return None,
                };
                Some((*name, value))
            })
            .collect()
    }

    fn string_at(&self, path: &str) -> Option<String> {
        match value_at_path(&self.raw, path)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    fn number_at(&self, path: &str) -> Option<f64> {
        value_at_path(&self.raw, path)?.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> AuthoritativePayload {
        AuthoritativePayload::new(json!({
            "identifier": { "attomId": 184713191, "apn": "12-00543-0092" },
            "building": {
                "rooms": { "beds": 4, "bathstotal": 2.5 },
                "size": { "universalsize": 2150 }
            },
            "summary": { "yearbuilt": 1987 },
            "lot": { "lotsize2": 9148 },
            "assessment": { "market": { "mkttlvalue": 412000 } },
            "avm": { "amount": { "value": 435500 } },
            "owner": { "owner1": { "name": "SMITH JOHN A" } },
            "sale": { "saleTransDate": "2019-07-12" }
        }))
    }

    #[test]
    fn test_typed_accessors() {
        let payload = sample_payload();
        assert_eq!(payload.owner_name().as_deref(), Some("SMITH JOHN A"));
        assert_eq!(payload.parcel_id().as_deref(), Some("184713191"));
        assert_eq!(payload.apn().as_deref(), Some("12-00543-0092"));
        assert_eq!(payload.avm(), Some(435500.0));
        assert_eq!(
            payload.last_event_date(),
            Some(NaiveDate::from_ymd_opt(2019, 7, 12).unwrap())
        );
    }

    #[test]
    fn test_attribute_mapping_resolves_all_paths() {
        let attrs = sample_payload().attributes();
        let beds = attrs.iter().find(|(name, _)| *name == attr::BEDROOMS);
        assert_eq!(beds, Some(&(attr::BEDROOMS, AttributeValue::Number(4.0))));

        let market = attrs.iter().find(|(name, _)| *name == attr::MARKET_VALUE);
        assert_eq!(
            market,
            Some(&(attr::MARKET_VALUE, AttributeValue::Number(412000.0)))
        );
        assert_eq!(attrs.len(), ATTRIBUTE_PATHS.len());
    }

    #[test]
    fn test_mapping_miss_is_no_value() {
        let payload = AuthoritativePayload::new(json!({
            "building": { "rooms": { "beds": 3 } }
        }));

        assert!(payload.owner_name().is_none());
        assert!(payload.avm().is_none());
        assert!(payload.last_event_date().is_none());
        assert_eq!(payload.attributes().len(), 1);
    }

    #[test]
    fn test_malformed_date_is_no_value() {
        let payload = AuthoritativePayload::new(json!({
            "sale": { "saleTransDate": "July 12, 2019" }
        }));
        assert!(payload.last_event_date().is_none());
    }

    #[test]
    fn test_value_at_path_stops_on_non_object() {
        let doc = json!({ "a": { "b": 7 } });
        assert_eq!(value_at_path(&doc, "a.b"), Some(&json!(7)));
        assert!(value_at_path(&doc, "a.b.c").is_none());
        assert!(value_at_path(&doc, "x.y").is_none());
    }
}
