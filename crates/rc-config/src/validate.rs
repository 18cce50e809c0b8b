//! Configuration validation errors and semantic validation.

use rc_common::FrequencyBand;
use thiserror::Error;

use crate::sampling::SamplingConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 41,
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for rc_common::Error {
    fn from(err: ValidationError) -> Self {
        rc_common::Error::InvalidConfig(err.to_string())
    }
}

/// Validate a sampling configuration semantically.
pub fn validate_sampling(config: &SamplingConfig) -> ValidationResult<()> {
    if !config.noise_ratio.is_finite() || !(0.0..=1.0).contains(&config.noise_ratio) {
        return Err(ValidationError::invalid(
            "noise_ratio",
            format!("must be within [0, 1], got {}", config.noise_ratio),
        ));
    }

    if !matches!(
        config.dx_criteria_frequency,
        FrequencyBand::Obligate | FrequencyBand::VeryFrequent
    ) {
        return Err(ValidationError::invalid(
            "dx_criteria_frequency",
            format!(
                "must be 'obligate' or 'very frequent', got '{}'",
                config.dx_criteria_frequency
            ),
        ));
    }

    if config.default_frequency.candidates().is_empty() {
        return Err(ValidationError::invalid(
            "default_frequency",
            "candidate list is empty",
        ));
    }

    let limits = &config.limits;
    for (field, value) in [
        ("limits.max_symptom_attempts", limits.max_symptom_attempts),
        ("limits.max_age_attempts", limits.max_age_attempts),
    ] {
        if value == 0 {
            return Err(ValidationError::invalid(field, "must be at least 1"));
        }
    }

    Ok(())
}
