//! Property identity-resolution and multi-source fusion engine
//!
//! Takes property records arriving from heterogeneous sources with
//! inconsistent formatting, determines which records describe the same
//! real-world property, and merges each cluster into a single best-evidence
//! lead record with field-level provenance and confidence tracking.
//!
//! # Architecture
//! - Normalizer: canonical address/person forms and signature hashes
//! - Source reliability table: static source-trust ranking for tie-breaks
//! - Completeness scorer: ranks records to pick a fusion base
//! - Fusion engine: merges one cluster into one fused lead
//! - Deduplicator: buckets a batch by address signature and fuses buckets
//! - Batch/stream processor: chunked orchestration with optional
//!   authoritative enhancement
//!
//! The fusion core is synchronous, pure computation; only stream processing
//! is async. The engine performs no I/O of its own.

pub mod fusion;
pub mod services;

pub use crate::fusion::LeadFuser;
pub use crate::services::batch_processor::{
    BatchOptions, BatchProcessor, StreamAborted, StreamOptions,
};
pub use crate::services::deduplicator::Deduplicator;
pub use crate::services::normalizer::{build_signatures, AddressSignatures};
pub use crate::services::reliability::SourceReliabilityTable;
