//! Configuration loading for the fusion engine
//!
//! Resolution priority: explicit path → `PROPFUSE_CONFIG` environment
//! variable → platform config directory → compiled defaults. Every setting
//! has a compiled default so the engine runs with no config file at all;
//! a file that exists but fails to parse or validate is a hard error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file path
pub const CONFIG_ENV_VAR: &str = "PROPFUSE_CONFIG";

/// Default records per chunk for stream processing
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Fusion constants
///
/// Tunables for conflict resolution and contact confidence aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Confidence recorded for values taken from the authoritative payload
    ///
    /// Default: 0.95
    pub authoritative_confidence: f64,

    /// Confidence added per extra source corroborating the same contact
    ///
    /// Default: 0.10
    pub corroboration_boost: f64,

    /// Upper bound on aggregated contact confidence
    ///
    /// Kept below 1.0: finite evidence never yields certainty.
    /// Default: 0.99
    pub contact_confidence_cap: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            authoritative_confidence: 0.95,
            corroboration_boost: 0.10,
            contact_confidence_cap: 0.99,
        }
    }
}

/// Batch/stream processing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Records per chunk in stream processing (minimum 1)
    ///
    /// Default: 100
    pub chunk_size: usize,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Engine configuration
///
/// `reliability` maps source-key substrings to reliability scores and is
/// merged over the built-in table (overrides take precedence on lookup).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fusion: FusionSettings,
    pub processing: ProcessingSettings,
    pub reliability: BTreeMap<String, u32>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `Error::Io` if the file cannot be read, `Error::Config` if it fails
    /// to parse, `Error::InvalidInput` if a setting is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration following the priority chain
    ///
    /// 1. Explicit path argument (highest priority)
    /// 2. `PROPFUSE_CONFIG` environment variable
    /// 3. Platform config directory (`<config_dir>/propfuse/config.toml`)
    /// 4. Compiled defaults (fallback)
    ///
    /// A path that is named explicitly (argument or environment) must load
    /// cleanly; a missing file at the platform default location falls
    /// through to compiled defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            info!(path = %path.display(), "Configuration loaded from explicit path");
            return Ok(config);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(env_path);
            let config = Self::load(&path)?;
            info!(path = %path.display(), "Configuration loaded from {}", CONFIG_ENV_VAR);
            return Ok(config);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                let config = Self::load(&path)?;
                info!(path = %path.display(), "Configuration loaded from platform config dir");
                return Ok(config);
            }
        }

        info!("No config file found; using compiled defaults");
        Ok(Self::default())
    }

    /// Validate setting ranges (fail-fast on misconfiguration)
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            (
                "fusion.authoritative_confidence",
                self.fusion.authoritative_confidence,
            ),
            ("fusion.corroboration_boost", self.fusion.corroboration_boost),
            (
                "fusion.contact_confidence_cap",
                self.fusion.contact_confidence_cap,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidInput(format!(
                    "{} out of range: {} (must be 0.0-1.0)",
                    name, value
                )));
            }
        }

        if self.processing.chunk_size == 0 {
            return Err(Error::InvalidInput(
                "processing.chunk_size must be at least 1".to_string(),
            ));
        }

        if self.fusion.contact_confidence_cap >= 1.0 {
            warn!(
                cap = self.fusion.contact_confidence_cap,
                "contact_confidence_cap at 1.0 allows certainty from finite evidence"
            );
        }

        Ok(())
    }
}

/// Platform config file path (`<config_dir>/propfuse/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("propfuse").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = EngineConfig::default();
        assert_eq!(config.fusion.authoritative_confidence, 0.95);
        assert_eq!(config.fusion.corroboration_boost, 0.10);
        assert_eq!(config.fusion.contact_confidence_cap, 0.99);
        assert_eq!(config.processing.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.reliability.is_empty());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let mut config = EngineConfig::default();
        config.fusion.authoritative_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = EngineConfig::default();
        config.processing.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [processing]
            chunk_size = 25

            [reliability]
            "my-scraper" = 77
            "#,
        )
        .unwrap();

        assert_eq!(config.processing.chunk_size, 25);
        assert_eq!(config.reliability.get("my-scraper"), Some(&77));
        // Unspecified sections keep compiled defaults
        assert_eq!(config.fusion.authoritative_confidence, 0.95);
    }
}
