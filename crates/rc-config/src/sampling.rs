//! Sampling configuration types.
//!
//! A `SamplingConfig` is immutable for the duration of a run. Fields missing
//! from a JSON file fall back to the `default` preset values.

use rc_common::FrequencyBand;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

/// Frequency used for annotations that carry none.
///
/// A list is sampled uniformly each time a fallback is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultFrequency {
    Single(FrequencyBand),
    Choice(Vec<FrequencyBand>),
}

impl DefaultFrequency {
    pub fn candidates(&self) -> &[FrequencyBand] {
        match self {
            DefaultFrequency::Single(band) => std::slice::from_ref(band),
            DefaultFrequency::Choice(bands) => bands,
        }
    }
}

impl Default for DefaultFrequency {
    fn default() -> Self {
        DefaultFrequency::Choice(vec![FrequencyBand::Frequent, FrequencyBand::Occasional])
    }
}

/// Attempt caps for every rejection loop in the patient sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingLimits {
    /// Whole base-selection passes before giving up on a non-empty phenotype.
    pub max_symptom_attempts: usize,

    /// Draws per onset or visit-delay rejection loop.
    pub max_age_attempts: usize,
}

impl Default for SamplingLimits {
    fn default() -> Self {
        Self {
            max_symptom_attempts: 10_000,
            max_age_attempts: 10_000,
        }
    }
}

/// Parameters of the stochastic patient sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Poisson mean of the number of hops a term is generalized by.
    pub imprecision: u32,

    /// Maximum noise terms as a fraction of the phenotype size.
    #[serde(alias = "noise")]
    pub noise_ratio: f64,

    /// Fallback band for diagnostic-criterion terms without a frequency.
    pub dx_criteria_frequency: FrequencyBand,

    /// Fallback band(s) for terms without a frequency.
    pub default_frequency: DefaultFrequency,

    /// Include every annotated term regardless of frequency.
    pub omit_frequency: bool,

    pub limits: SamplingLimits,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            imprecision: 1,
            noise_ratio: 0.25,
            dx_criteria_frequency: FrequencyBand::VeryFrequent,
            default_frequency: DefaultFrequency::default(),
            omit_frequency: false,
            limits: SamplingLimits::default(),
        }
    }
}

impl SamplingConfig {
    /// Load a sampling config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse a sampling config from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Poisson mean as a float for the samplers.
    pub fn poisson_lambda(&self) -> f64 {
        f64::from(self.imprecision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_default_preset() {
        let config = SamplingConfig::default();
        assert_eq!(config.imprecision, 1);
        assert_eq!(config.noise_ratio, 0.25);
        assert_eq!(config.dx_criteria_frequency, FrequencyBand::VeryFrequent);
        assert_eq!(
            config.default_frequency.candidates(),
            &[FrequencyBand::Frequent, FrequencyBand::Occasional]
        );
        assert!(!config.omit_frequency);
        assert_eq!(config.limits.max_symptom_attempts, 10_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SamplingConfig::from_str(r#"{"imprecision": 2, "noise": 0.1}"#).unwrap();
        assert_eq!(config.imprecision, 2);
        assert_eq!(config.noise_ratio, 0.1);
        assert_eq!(config.limits, SamplingLimits::default());
    }

    #[test]
    fn default_frequency_accepts_single_or_list() {
        let single = SamplingConfig::from_str(r#"{"default_frequency": "HP:0040283"}"#).unwrap();
        assert_eq!(
            single.default_frequency,
            DefaultFrequency::Single(FrequencyBand::Occasional)
        );
        assert_eq!(single.default_frequency.candidates().len(), 1);

        let list =
            SamplingConfig::from_str(r#"{"default_frequency": ["frequent", "HP:0040284"]}"#)
                .unwrap();
        assert_eq!(
            list.default_frequency.candidates(),
            &[FrequencyBand::Frequent, FrequencyBand::VeryRare]
        );
    }

    #[test]
    fn unknown_band_is_parse_error() {
        let err = SamplingConfig::from_str(r#"{"dx_criteria_frequency": "always"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
