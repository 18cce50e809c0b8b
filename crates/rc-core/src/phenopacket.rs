//! Phenopacket export.
//!
//! Converts a simulation run into phenopacket-shaped JSON records, one per
//! patient. Field names follow the phenopacket JSON mapping (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cohort::{Cohort, Patient, SimulationRun};
use crate::ontology::OntologyQuery;

pub const SUBMITTED_BY: &str = "patient sampler";

/// An ontology class reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyClass {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
    /// ISO 8601 duration, e.g. `P4Y6M`.
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_at_collection: Option<Age>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenotypicFeature {
    #[serde(rename = "type")]
    pub term: OntologyClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub term: OntologyClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub version: String,
    pub namespace_prefix: String,
    pub iri_prefix: String,
}

impl Resource {
    /// The Human Phenotype Ontology resource entry.
    pub fn hpo() -> Self {
        Resource {
            id: "hp".to_string(),
            name: "human phenotype ontology".to_string(),
            url: "http://purl.obolibrary.org/obo/hp.owl".to_string(),
            version: String::new(),
            namespace_prefix: "HP".to_string(),
            iri_prefix: "http://purl.obolibrary.org/obo/HP_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub created: DateTime<Utc>,
    pub submitted_by: String,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phenopacket {
    pub id: String,
    pub subject: Subject,
    pub phenotypic_features: Vec<PhenotypicFeature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diseases: Vec<Disease>,
    pub meta_data: MetaData,
}

impl Phenopacket {
    pub fn from_patient<O>(cohort: &Cohort, patient: &Patient, created: DateTime<Utc>, ontology: &O) -> Self
    where
        O: OntologyQuery + ?Sized,
    {
        let phenotypic_features = patient
            .phenotype
            .iter()
            .map(|term| PhenotypicFeature {
                term: OntologyClass {
                    id: term.to_string(),
                    label: ontology.label(term.as_str()).map(str::to_string),
                },
            })
            .collect();

        Phenopacket {
            id: patient.id.to_string(),
            subject: Subject {
                id: patient.subject_id.to_string(),
                age_at_collection: patient.age.map(|years| Age {
                    age: iso8601_age(years),
                }),
            },
            phenotypic_features,
            diseases: vec![Disease {
                term: OntologyClass {
                    id: cohort.disease_id.to_string(),
                    label: cohort.name.clone(),
                },
            }],
            meta_data: MetaData {
                created,
                submitted_by: SUBMITTED_BY.to_string(),
                resources: vec![Resource::hpo()],
            },
        }
    }
}

/// One phenopacket per generated patient, in cohort order.
pub fn to_phenopackets<O>(run: &SimulationRun, ontology: &O) -> Vec<Phenopacket>
where
    O: OntologyQuery + ?Sized,
{
    run.patients()
        .map(|(cohort, patient)| Phenopacket::from_patient(cohort, patient, run.created, ontology))
        .collect()
}

/// Years as an ISO 8601 duration with whole months. Negative (antenatal)
/// ages clamp to `P0Y0M`.
pub fn iso8601_age(years: f64) -> String {
    let total_months = if years.is_finite() && years > 0.0 {
        (years * 12.0).floor() as u64
    } else {
        0
    };
    format!("P{}Y{}M", total_months / 12, total_months % 12)
}
