//! Error types for RareCrowds.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Unknown Age Class
//!   Reason: unknown age class: 'toddler'
//!   Fix: Use one of: antenatal, neonatal, infancy, childhood, ...
//! ```
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 12,
//!   "category": "sampling",
//!   "message": "sampling exhausted in onset after 10000 attempts",
//!   "recoverable": false,
//!   "suggested_action": "skip",
//!   "context": { "stage": "onset", "attempts": 10000 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Result type alias for RareCrowds operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Stochastic sampling and lookup errors.
    Sampling,
    /// Disease annotation errors.
    Annotation,
    /// Ontology structure errors.
    Ontology,
    /// Sampling configuration errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Sampling => write!(f, "sampling"),
            ErrorCategory::Annotation => write!(f, "annotation"),
            ErrorCategory::Ontology => write!(f, "ontology"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for automation to take in response to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Run the `check` command against the inputs.
    RunCheck,
    /// Skip this item and continue.
    Skip,
    /// Abort the run.
    Abort,
    /// Manual intervention required.
    ManualIntervention,
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::Skip => write!(f, "skip"),
            SuggestedAction::Abort => write!(f, "abort"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// The rejection loop that ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStage {
    /// Base symptom selection (non-empty phenotype requirement).
    Symptoms,
    /// Onset age draw.
    Onset,
    /// Time-to-visit draw.
    Visit,
    /// Unique identifier redraws.
    Identifier,
}

impl fmt::Display for SamplingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SamplingStage::Symptoms => "symptoms",
            SamplingStage::Onset => "onset",
            SamplingStage::Visit => "visit",
            SamplingStage::Identifier => "identifier",
        };
        write!(f, "{}", s)
    }
}

/// Unified error type for RareCrowds.
#[derive(Error, Debug)]
pub enum Error {
    // Sampling errors (10-19)
    #[error("unknown frequency band: '{value}'")]
    UnknownFrequencyBand { value: String },

    #[error("unknown age class: '{value}'")]
    UnknownAgeClass { value: String },

    #[error("sampling exhausted in {stage} after {attempts} attempts")]
    SamplingExhausted {
        stage: SamplingStage,
        attempts: usize,
    },

    // Annotation errors (20-29)
    #[error("disease {disease} has no phenotype annotations")]
    EmptyAnnotation { disease: String },

    #[error("disease not found: {disease}")]
    UnknownDisease { disease: String },

    // Ontology errors (30-39)
    #[error("duplicate term in ontology: {id}")]
    OntologyDuplicateTerm { id: String },

    #[error("edge references unknown term: {id}")]
    OntologyUnknownTerm { id: String },

    #[error("ontology contains a cycle through {id}")]
    OntologyCycle { id: String },

    #[error("ontology must have exactly one root, found {count}: [{roots}]")]
    OntologyRoots { count: usize, roots: String },

    #[error("term {id} is not reachable from the root")]
    OntologyUnreachable { id: String },

    // Configuration errors (40-49)
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Sampling errors
    /// - 20-29: Annotation errors
    /// - 30-39: Ontology errors
    /// - 40-49: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::UnknownFrequencyBand { .. } => 10,
            Error::UnknownAgeClass { .. } => 11,
            Error::SamplingExhausted { .. } => 12,
            Error::EmptyAnnotation { .. } => 20,
            Error::UnknownDisease { .. } => 21,
            Error::OntologyDuplicateTerm { .. } => 30,
            Error::OntologyUnknownTerm { .. } => 31,
            Error::OntologyCycle { .. } => 32,
            Error::OntologyRoots { .. } => 33,
            Error::OntologyUnreachable { .. } => 34,
            Error::UnknownPreset(_) => 40,
            Error::InvalidConfig(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownFrequencyBand { .. }
            | Error::UnknownAgeClass { .. }
            | Error::SamplingExhausted { .. } => ErrorCategory::Sampling,

            Error::EmptyAnnotation { .. } | Error::UnknownDisease { .. } => {
                ErrorCategory::Annotation
            }

            Error::OntologyDuplicateTerm { .. }
            | Error::OntologyUnknownTerm { .. }
            | Error::OntologyCycle { .. }
            | Error::OntologyRoots { .. }
            | Error::OntologyUnreachable { .. } => ErrorCategory::Ontology,

            Error::UnknownPreset(_) | Error::InvalidConfig(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether the run can continue past this error.
    ///
    /// Recoverable errors are confined to one disease or one patient; the
    /// assembler records them and moves on to the next item.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::UnknownFrequencyBand { .. } => false,
            Error::UnknownAgeClass { .. } => false,
            Error::SamplingExhausted { .. } => true,

            Error::EmptyAnnotation { .. } => true,
            Error::UnknownDisease { .. } => true,

            Error::OntologyDuplicateTerm { .. }
            | Error::OntologyUnknownTerm { .. }
            | Error::OntologyCycle { .. }
            | Error::OntologyRoots { .. }
            | Error::OntologyUnreachable { .. } => false,

            Error::UnknownPreset(_) => false,
            Error::InvalidConfig(_) => false,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns the suggested action for automation.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::UnknownFrequencyBand { .. } | Error::UnknownAgeClass { .. } => {
                SuggestedAction::RunCheck
            }
            Error::SamplingExhausted { .. } => SuggestedAction::Skip,

            Error::EmptyAnnotation { .. } | Error::UnknownDisease { .. } => SuggestedAction::Skip,

            Error::OntologyDuplicateTerm { .. }
            | Error::OntologyUnknownTerm { .. }
            | Error::OntologyCycle { .. }
            | Error::OntologyRoots { .. }
            | Error::OntologyUnreachable { .. } => SuggestedAction::Abort,

            Error::UnknownPreset(_) | Error::InvalidConfig(_) => SuggestedAction::RunCheck,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::UnknownFrequencyBand { .. } => {
                "Use one of the six HPO frequency terms (HP:0040280..HP:0040285) or their names: obligate, very frequent, frequent, occasional, very rare, excluded."
            }
            Error::UnknownAgeClass { .. } => {
                "Use one of: antenatal, neonatal, infancy, childhood, adolescent, adult, elderly, all ages, no data available, or a [min, max] pair in years."
            }
            Error::SamplingExhausted { .. } => {
                "The annotation data admits (almost) no valid draw. Check the disease's onset interval and frequency table, or raise the limits in sampling.json."
            }

            Error::EmptyAnnotation { .. } => {
                "The disease has no phenotype table. It is reported with an empty cohort."
            }
            Error::UnknownDisease { .. } => {
                "The disease id is not present in the annotation file. List ids with 'rc-core check --annotations <file>'."
            }

            Error::OntologyDuplicateTerm { .. } | Error::OntologyUnknownTerm { .. } => {
                "The ontology graph file is inconsistent. Re-export it from the source ontology."
            }
            Error::OntologyCycle { .. } => {
                "The is-a hierarchy must be acyclic. Re-export the ontology without obsolete or cross-linked terms."
            }
            Error::OntologyRoots { .. } | Error::OntologyUnreachable { .. } => {
                "The ontology must have a single root from which every term is reachable."
            }

            Error::UnknownPreset(_) => {
                "Run 'rc-core presets' to list the available sampling presets."
            }
            Error::InvalidConfig(_) => {
                "Run 'rc-core check --config <file>' to validate the sampling configuration."
            }

            Error::Io(_) => "Check that the input files exist and are readable. Retry the operation.",
            Error::Json(_) => {
                "Invalid JSON in file. Check syntax with 'cat <file> | jq .' or regenerate it."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::UnknownFrequencyBand { .. } => "Unknown Frequency Band",
            Error::UnknownAgeClass { .. } => "Unknown Age Class",
            Error::SamplingExhausted { .. } => "Sampling Exhausted",
            Error::EmptyAnnotation { .. } => "Empty Annotation",
            Error::UnknownDisease { .. } => "Unknown Disease",
            Error::OntologyDuplicateTerm { .. } => "Duplicate Ontology Term",
            Error::OntologyUnknownTerm { .. } => "Unknown Ontology Term",
            Error::OntologyCycle { .. } => "Ontology Cycle",
            Error::OntologyRoots { .. } => "Invalid Ontology Root",
            Error::OntologyUnreachable { .. } => "Unreachable Ontology Term",
            Error::UnknownPreset(_) => "Unknown Preset",
            Error::InvalidConfig(_) => "Invalid Configuration",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
///
/// Also embedded in run summaries to explain skipped patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for automation.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., offending value).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::UnknownFrequencyBand { value } | Error::UnknownAgeClass { value } => {
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::SamplingExhausted { stage, attempts } => {
                context.insert("stage".to_string(), serde_json::json!(stage));
                context.insert("attempts".to_string(), serde_json::json!(attempts));
            }
            Error::EmptyAnnotation { disease } | Error::UnknownDisease { disease } => {
                context.insert("disease".to_string(), serde_json::json!(disease));
            }
            Error::OntologyDuplicateTerm { id }
            | Error::OntologyUnknownTerm { id }
            | Error::OntologyCycle { id }
            | Error::OntologyUnreachable { id } => {
                context.insert("term".to_string(), serde_json::json!(id));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = Error::UnknownAgeClass {
            value: "toddler".into(),
        };
        assert_eq!(err.code(), 11);
        assert_eq!(
            Error::SamplingExhausted {
                stage: SamplingStage::Onset,
                attempts: 10
            }
            .code(),
            12
        );
        assert_eq!(Error::InvalidConfig("x".into()).code(), 41);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::UnknownFrequencyBand { value: "x".into() }.category(),
            ErrorCategory::Sampling
        );
        assert_eq!(
            Error::EmptyAnnotation {
                disease: "ORPHA:1".into()
            }
            .category(),
            ErrorCategory::Annotation
        );
        assert_eq!(
            Error::OntologyCycle { id: "HP:1".into() }.category(),
            ErrorCategory::Ontology
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::SamplingExhausted {
            stage: SamplingStage::Visit,
            attempts: 1
        }
        .is_recoverable());
        assert!(Error::EmptyAnnotation {
            disease: "ORPHA:1".into()
        }
        .is_recoverable());
        assert!(!Error::UnknownAgeClass { value: "x".into() }.is_recoverable());
        assert!(!Error::UnknownFrequencyBand { value: "x".into() }.is_recoverable());
    }

    #[test]
    fn test_offending_value_in_message() {
        let err = Error::UnknownFrequencyBand {
            value: "sometimes".into(),
        };
        assert!(err.to_string().contains("'sometimes'"));
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::SamplingExhausted {
            stage: SamplingStage::Symptoms,
            attempts: 500,
        };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 12);
        assert_eq!(structured.category, ErrorCategory::Sampling);
        assert!(structured.recoverable);
        assert_eq!(structured.suggested_action, SuggestedAction::Skip);
        assert_eq!(
            structured.context.get("stage"),
            Some(&serde_json::json!("symptoms"))
        );
        assert_eq!(
            structured.context.get("attempts"),
            Some(&serde_json::json!(500))
        );
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::UnknownAgeClass {
            value: "toddler".into(),
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":11"#));
        assert!(json.contains(r#""category":"sampling""#));
        assert!(json.contains(r#""recoverable":false"#));
        assert!(json.contains(r#""value":"toddler""#));
    }

    #[test]
    fn test_with_context() {
        let err = Error::EmptyAnnotation {
            disease: "ORPHA:2".into(),
        };
        let structured = StructuredError::from(&err).with_context("patients", 20);
        assert_eq!(
            structured.context.get("patients"),
            Some(&serde_json::json!(20))
        );
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::UnknownPreset("turbo".into());
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Unknown Preset"));
        assert!(formatted.contains("unknown preset: turbo"));
        assert!(formatted.contains("rc-core presets"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(SamplingStage::Visit.to_string(), "visit");
        assert_eq!(SamplingStage::Identifier.to_string(), "identifier");
        assert_eq!(ErrorCategory::Ontology.to_string(), "ontology");
        assert_eq!(SuggestedAction::RunCheck.to_string(), "run_check");
    }
}
