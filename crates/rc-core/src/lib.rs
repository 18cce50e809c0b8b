//! RareCrowds Core Library
//!
//! Synthetic rare-disease cohort generation:
//! - Ontology index over the is-a term hierarchy
//! - Disease annotations and age-of-onset intervals
//! - The per-patient phenotype and age sampler
//! - Cohort assembly with run-unique identifiers
//! - Phenopacket export
//!
//! The binary entry point is in `main.rs`.

pub mod annotation;
pub mod cohort;
pub mod config;
pub mod exit_codes;
pub mod generator;
pub mod logging;
pub mod onset;
pub mod ontology;
pub mod phenopacket;

pub use annotation::{AnnotationSet, DiseaseAnnotation, DiseaseAnnotations, PhenotypeAnnotation};
pub use cohort::{Cohort, CohortAssembler, CohortRequest, Patient, RunSummary, SimulationRun};
pub use generator::{PatientSampler, SampledPatient};
pub use onset::{AgeClass, OnsetDescriptor, OnsetInterval};
pub use ontology::{Ontology, OntologyBuilder, OntologyQuery, FULL_DEPTH};
