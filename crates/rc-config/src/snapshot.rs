//! Sampling config snapshots for run provenance.
//!
//! A snapshot captures the effective configuration at the start of a run so
//! that a cohort can be traced back to the parameters that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::SamplingPath;
use crate::sampling::SamplingConfig;

/// A frozen snapshot of the sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Where the config came from.
    pub source: String,

    /// Path the config was loaded from, if any.
    #[serde(default)]
    pub path: Option<String>,

    /// Preset name when no file was used.
    #[serde(default)]
    pub preset: Option<String>,

    /// SHA-256 of the canonical JSON form of the effective config.
    pub config_hash: String,

    /// The effective config.
    pub config: SamplingConfig,
}

impl SamplingSnapshot {
    pub fn new(config: &SamplingConfig, resolved: &SamplingPath, preset: Option<&str>) -> Self {
        SamplingSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            source: resolved.source.to_string(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
            preset: preset.map(str::to_string),
            config_hash: config_hash(config),
            config: config.clone(),
        }
    }

    /// Check whether another snapshot carries the same effective config.
    pub fn same_config(&self, other: &SamplingSnapshot) -> bool {
        self.config_hash == other.config_hash
    }
}

/// SHA-256 of the config's JSON serialization, hex-encoded.
pub fn config_hash(config: &SamplingConfig) -> String {
    let json = serde_json::to_string(config).unwrap_or_default();
    hash_content(&json)
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{get_preset, PresetName};

    #[test]
    fn test_hash_content_deterministic() {
        let a = hash_content("{\"imprecision\":1}");
        let b = hash_content("{\"imprecision\":1}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_snapshot_from_preset() {
        let config = get_preset(PresetName::Ideal);
        let snap = SamplingSnapshot::new(&config, &SamplingPath::default(), Some("ideal"));
        assert_eq!(snap.source, "preset");
        assert_eq!(snap.preset.as_deref(), Some("ideal"));
        assert!(snap.path.is_none());
        assert_eq!(snap.config, config);
    }

    #[test]
    fn test_same_config_compares_hashes() {
        let path = SamplingPath::default();
        let a = SamplingSnapshot::new(&get_preset(PresetName::Impre), &path, None);
        let b = SamplingSnapshot::new(&get_preset(PresetName::Impre), &path, None);
        let c = SamplingSnapshot::new(&get_preset(PresetName::Impre2), &path, None);
        assert!(a.same_config(&b));
        assert!(!a.same_config(&c));
    }

    #[test]
    fn test_snapshot_serializes() {
        let snap = SamplingSnapshot::new(&SamplingConfig::default(), &SamplingPath::default(), None);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["schema_version"], "1.0.0");
        assert_eq!(json["config"]["imprecision"], 1);
    }
}
