//! Fusion layer
//!
//! Merges a cluster of raw records believed to describe the same property
//! (plus an optional authoritative payload) into one fused lead record with
//! per-field provenance.

pub mod lead_fuser;

pub use lead_fuser::{LeadFuser, AUTHORITATIVE_SOURCE};
