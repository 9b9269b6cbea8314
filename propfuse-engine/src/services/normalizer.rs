//! Address and person-name normalization
//!
//! Canonicalizes raw address strings into comparable forms and produces the
//! deterministic signature hashes used for exact-match bucketing. Two
//! records of the same property must bucket together regardless of
//! data-entry noise, so every function here is total: empty or missing
//! input normalizes to an empty-but-stable string, never an error.
//!
//! # Signatures
//! The primary signature hashes `street|city|state|zip` (plus an optional
//! person key) and distinguishes units within the same building. The
//! secondary signature hashes the same key with unit/suite/floor markers
//! stripped from the street, letting downstream matching treat
//! "123 MAIN STREET APT 4" and "123 MAIN STREET" as the same building when
//! unit-level precision is unavailable or noisy across sources.

use propfuse_common::models::RawPropertyRecord;
use sha2::{Digest, Sha256};

/// Street-suffix expansions, applied when the abbreviation is the final
/// token of the street line
const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("ST", "STREET"),
    ("AVE", "AVENUE"),
    ("BLVD", "BOULEVARD"),
    ("RD", "ROAD"),
    ("DR", "DRIVE"),
    ("LN", "LANE"),
    ("CT", "COURT"),
    ("PL", "PLACE"),
    ("TER", "TERRACE"),
    ("HWY", "HIGHWAY"),
];

/// Unit/suite/floor marker tokens; each is followed by its value
const UNIT_MARKERS: &[&str] = &["APT", "UNIT", "STE", "SUITE", "FL", "FLOOR"];

/// Signature computation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSignatures {
    /// Unit-precise signature (SHA-256 hex)
    pub primary: String,
    /// Building-level signature with unit markers stripped
    pub secondary: String,
    /// Normalized `street|city|state|zip` key
    pub normalized_address: String,
    /// Normalized `FIRST|LAST` person key
    pub normalized_person: String,
    /// Whether unit-marker stripping changed the street (primary and
    /// secondary differ)
    pub has_unit: bool,
}

/// Canonicalize a street line
///
/// Uppercases, strips periods and commas, collapses whitespace, and expands
/// a trailing street-suffix abbreviation.
pub fn normalize_street(raw: &str) -> String {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if let Some(last) = tokens.last_mut() {
        for (abbrev, full) in STREET_SUFFIXES {
            if *last == *abbrev {
                *last = *full;
                break;
            }
        }
    }

    tokens.join(" ")
}

/// Canonicalize city, state, and zip
///
/// Uppercases and trims city/state; reduces ZIP to its 5-digit prefix,
/// stripping any ZIP+4 suffix. Non-matching zip values pass through trimmed
/// but unchanged.
pub fn normalize_city_state_zip(
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
) -> (String, String, String) {
    let city = city.unwrap_or("").trim().to_uppercase();
    let state = state.unwrap_or("").trim().to_uppercase();
    let zip = normalize_zip(zip.unwrap_or(""));
    (city, state, zip)
}

fn normalize_zip(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    let five_digit_prefix =
        bytes.len() >= 5 && bytes[..5].iter().all(|b| b.is_ascii_digit());
    if five_digit_prefix && (bytes.len() == 5 || bytes[5] == b'-') {
        trimmed[..5].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Canonical person key, `FIRST|LAST`
///
/// Used only for signature computation, never stored as a display name.
pub fn normalize_person(first: Option<&str>, last: Option<&str>) -> String {
    format!(
        "{}|{}",
        first.unwrap_or("").trim().to_uppercase(),
        last.unwrap_or("").trim().to_uppercase()
    )
}

/// Whether the street line carries a unit/suite/floor marker with a value
pub fn has_unit_markers(street_raw: &str) -> bool {
    let normalized = normalize_street(street_raw);
    strip_unit_markers(&normalized) != normalized
}

/// Remove unit/suite/floor markers (and their values) from a normalized
/// street line
fn strip_unit_markers(street: &str) -> String {
    let tokens: Vec<&str> = street.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        // "#4" carries its value inline; "APT 4" spans two tokens
        if token.starts_with('#') && token.len() > 1 {
            i += 1;
            continue;
        }
        let is_marker = token == "#" || UNIT_MARKERS.contains(&token);
        if is_marker && i + 1 < tokens.len() {
            i += 2;
            continue;
        }
        kept.push(token);
        i += 1;
    }
    kept.join(" ")
}

/// Compute primary and secondary signatures for an address (+ optional
/// person)
///
/// Deterministic and total: missing fields contribute empty components, so
/// even a degenerate record hashes stably.
pub fn build_signatures(
    street: &str,
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
    first: Option<&str>,
    last: Option<&str>,
) -> AddressSignatures {
    let street_norm = normalize_street(street);
    let (city_norm, state_norm, zip_norm) = normalize_city_state_zip(city, state, zip);
    let person = normalize_person(first, last);

    let normalized_address =
        format!("{}|{}|{}|{}", street_norm, city_norm, state_norm, zip_norm);
    let primary = digest_hex(&format!("{}#{}", normalized_address, person));

    let sanitized_street = strip_unit_markers(&street_norm);
    let sanitized_address = format!(
        "{}|{}|{}|{}",
        sanitized_street, city_norm, state_norm, zip_norm
    );
    let secondary = digest_hex(&format!("{}#{}", sanitized_address, person));

    AddressSignatures {
        primary,
        secondary,
        normalized_address,
        normalized_person: person,
        has_unit: sanitized_street != street_norm,
    }
}

/// Fill a record's missing `address_hash` from its address fields
///
/// The hash is a pure function of normalized address fields only (never
/// owner or attributes), so two records of the same property always bucket
/// together. A record with an empty street line stays un-hashed: bucketing
/// every street-less record together would be worse than leaving them
/// un-grouped.
pub fn ensure_address_hash(record: &mut RawPropertyRecord) {
    if record.address_hash.is_some() || record.address.street.trim().is_empty() {
        return;
    }

    let signatures = build_signatures(
        &record.address.street,
        record.address.city.as_deref(),
        record.address.state.as_deref(),
        record.address.zip.as_deref(),
        None,
        None,
    );
    tracing::trace!(
        source = %record.source_key,
        hash = %signatures.primary,
        "Computed address hash"
    );
    record.address_hash = Some(signatures.primary);
}

fn digest_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
