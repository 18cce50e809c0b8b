//! RareCrowds sampling configuration loading and validation.
//!
//! This crate provides:
//! - The typed `SamplingConfig` and its rejection-loop limits
//! - Named presets (`default`, `ideal`, `freqs`, `impre`, `impre2`)
//! - Config resolution (CLI → env → XDG → system → preset)
//! - Semantic validation
//! - Config snapshots recorded with each simulation run

pub mod preset;
pub mod resolve;
pub mod sampling;
pub mod snapshot;
pub mod validate;

pub use preset::{get_preset, list_presets, PresetName};
pub use resolve::{resolve_sampling, ConfigSource, SamplingPath};
pub use sampling::{DefaultFrequency, SamplingConfig, SamplingLimits};
pub use snapshot::SamplingSnapshot;
pub use validate::{validate_sampling, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
