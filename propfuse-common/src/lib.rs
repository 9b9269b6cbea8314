//! Shared types for the PropFuse workspace
//!
//! Data models (raw property records, fused leads, authoritative payloads),
//! configuration loading, and the common error type used across crates.

pub mod config;
pub mod error;
pub mod models;

pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
