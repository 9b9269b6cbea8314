//! Raw property records as produced by scraper adapters
//!
//! One `RawPropertyRecord` is a single observation of a property from a
//! single source. Records are immutable once captured; the only mutation the
//! engine performs is filling a missing `address_hash` before grouping.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Well-known attribute keys
///
/// The attribute map is open: unknown keys pass through fusion untouched.
/// These are the keys the completeness scorer and the authoritative mapping
/// know about.
pub mod attr {
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const SQUARE_FEET: &str = "square_feet";
    pub const YEAR_BUILT: &str = "year_built";
    pub const LOT_SIZE: &str = "lot_size";
    /// Assessed market value, populated from the authoritative mapping
    pub const MARKET_VALUE: &str = "market_value";
}

/// Property street address
///
/// Only the street line is required; scrapers frequently omit the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAddress {
    /// Street line, possibly empty for malformed listings
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl PropertyAddress {
    pub fn new(street: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for PropertyAddress {
    /// Renders "STREET, CITY, STATE ZIP", skipping absent parts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.street)?;
        if let Some(city) = &self.city {
            write!(f, ", {}", city)?;
        }
        if let Some(state) = &self.state {
            write!(f, ", {}", state)?;
        }
        if let Some(zip) = &self.zip {
            write!(f, " {}", zip)?;
        }
        Ok(())
    }
}

/// Attribute value: numeric or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Number(_) => None,
            AttributeValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Contact channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Phone,
    Email,
}

/// Confidence-scored contact observation from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub method: ContactMethod,
    pub value: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    /// Source that reported this contact
    pub source: String,
}

impl Contact {
    /// Create new contact with clamped confidence (0.0-1.0)
    pub fn new(
        method: ContactMethod,
        value: impl Into<String>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            method,
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source: source.into(),
        }
    }
}

/// One observation of a property from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPropertyRecord {
    pub address: PropertyAddress,
    pub owner_name: Option<String>,
    /// Open attribute map; see [`attr`] for the well-known keys
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    pub price_hint: Option<f64>,
    /// Distress tags, e.g. "tax-lien", "pre-foreclosure"
    #[serde(default)]
    pub distress_signals: BTreeSet<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    pub parcel_id: Option<String>,
    pub apn: Option<String>,
    pub last_event_date: Option<NaiveDate>,
    /// Origin identifier, e.g. "zillow", "county-records"
    pub source_key: String,
    pub source_url: Option<String>,
    pub captured_at: DateTime<Utc>,
    /// Address signature; computed from normalized address fields only
    /// (never owner or attributes) when absent
    pub address_hash: Option<String>,
}

impl RawPropertyRecord {
    /// Create a record with the given street line and source key;
    /// everything else empty
    pub fn new(street: impl Into<String>, source_key: impl Into<String>) -> Self {
        Self {
            address: PropertyAddress::new(street),
            owner_name: None,
            attributes: BTreeMap::new(),
            price_hint: None,
            distress_signals: BTreeSet::new(),
            contacts: Vec::new(),
            parcel_id: None,
            apn: None,
            last_event_date: None,
            source_key: source_key.into(),
            source_url: None,
            captured_at: Utc::now(),
            address_hash: None,
        }
    }
}
