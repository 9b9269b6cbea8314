//! Data models shared across the PropFuse workspace

pub mod authoritative;
pub mod fused_lead;
pub mod raw_record;

pub use authoritative::AuthoritativePayload;
pub use fused_lead::{ConflictEntry, FusedContact, FusedLeadRecord, SourceEntry};
pub use raw_record::{
    attr, AttributeValue, Contact, ContactMethod, PropertyAddress, RawPropertyRecord,
};
