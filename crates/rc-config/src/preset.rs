//! Named sampling presets.
//!
//! Provides pre-built configurations for:
//! - Default: moderate imprecision and noise
//! - Ideal: every annotated term, no imprecision or noise
//! - Freqs: frequency-driven selection only
//! - Impre / Impre2: imprecision without noise

use rc_common::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sampling::SamplingConfig;

/// Available sampling presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Imprecision 1, noise 0.25
    Default,
    /// All annotated terms, exactly as annotated
    Ideal,
    /// Frequency sampling without imprecision or noise
    Freqs,
    /// Imprecision 1 without noise
    Impre,
    /// Imprecision 2 without noise
    Impre2,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Default,
        PresetName::Ideal,
        PresetName::Freqs,
        PresetName::Impre,
        PresetName::Impre2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Ideal => "ideal",
            PresetName::Freqs => "freqs",
            PresetName::Impre => "impre",
            PresetName::Impre2 => "impre2",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.trim().to_lowercase().as_str() {
            "default" => Some(PresetName::Default),
            "ideal" | "exact" => Some(PresetName::Ideal),
            "freqs" | "frequencies" => Some(PresetName::Freqs),
            "impre" | "imprecise" => Some(PresetName::Impre),
            "impre2" => Some(PresetName::Impre2),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => "Imprecision 1 and noise ratio 0.25",
            PresetName::Ideal => "Every annotated term, no imprecision, no noise",
            PresetName::Freqs => "Terms sampled by frequency only",
            PresetName::Impre => "Frequency sampling with imprecision 1, no noise",
            PresetName::Impre2 => "Frequency sampling with imprecision 2, no noise",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| Error::UnknownPreset(s.to_string()))
    }
}

/// Get the sampling config for a preset.
pub fn get_preset(name: PresetName) -> SamplingConfig {
    let (imprecision, noise_ratio, omit_frequency) = match name {
        PresetName::Default => (1, 0.25, false),
        PresetName::Ideal => (0, 0.0, true),
        PresetName::Freqs => (0, 0.0, false),
        PresetName::Impre => (1, 0.0, false),
        PresetName::Impre2 => (2, 0.0, false),
    };
    SamplingConfig {
        imprecision,
        noise_ratio,
        omit_frequency,
        ..SamplingConfig::default()
    }
}

/// Information about a preset for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub imprecision: u32,
    pub noise_ratio: f64,
    pub omit_frequency: bool,
}

impl PresetInfo {
    pub fn from_preset(name: PresetName) -> Self {
        let config = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            imprecision: config.imprecision,
            noise_ratio: config.noise_ratio,
            omit_frequency: config.omit_frequency,
        }
    }
}

/// List all available presets with summary information.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}
