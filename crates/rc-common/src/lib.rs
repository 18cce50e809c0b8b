//! RareCrowds common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Term, disease, patient and subject identifiers
//! - The canonical phenotype frequency bands
//! - The error taxonomy and its structured form
//! - Output formats

pub mod error;
pub mod frequency;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result, SamplingStage, StructuredError};
pub use frequency::{FrequencyBand, FrequencyInterval};
pub use id::{DiseaseId, IdAllocator, PatientId, SubjectId, TermId};
pub use output::OutputFormat;

/// Schema version stamped on serialized simulation runs.
pub const SCHEMA_VERSION: &str = "1.0.0";
