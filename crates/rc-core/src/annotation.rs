//! Disease phenotype annotations.
//!
//! Each disease carries a phenotype-frequency table (term → optional band and
//! modifier flags) and a list of onset descriptors. Band ids are kept as raw
//! strings and resolved at sampling time so that an unknown band surfaces
//! with the offending value rather than failing the whole file.

use rc_common::{DiseaseId, Error, FrequencyBand, Result, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::ontology::OntologyQuery;
use crate::onset::{OnsetDescriptor, OnsetInterval};

/// Modifier flags on one annotated term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(default)]
    pub diagnostic_criteria: bool,
}

/// One row of a phenotype-frequency table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenotypeAnnotation {
    /// Frequency band term id (or name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl PhenotypeAnnotation {
    pub fn with_band(band: FrequencyBand) -> Self {
        PhenotypeAnnotation {
            frequency: Some(band.id().to_string()),
            modifier: None,
        }
    }

    pub fn is_diagnostic_criterion(&self) -> bool {
        self.modifier
            .as_ref()
            .is_some_and(|m| m.diagnostic_criteria)
    }

    /// Resolve the annotated band; `None` when the row carries no frequency.
    pub fn band(&self) -> Result<Option<FrequencyBand>> {
        match self.frequency.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

/// Annotation record for one disease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub phenotype: BTreeMap<TermId, PhenotypeAnnotation>,

    #[serde(default)]
    pub age_onset: Vec<OnsetDescriptor>,
}

impl DiseaseAnnotation {
    pub fn onset(&self) -> Result<OnsetInterval> {
        OnsetInterval::from_descriptors(&self.age_onset)
    }

    /// Check that every band and onset token resolves.
    pub fn validate(&self, disease: &DiseaseId) -> Result<()> {
        if self.phenotype.is_empty() {
            return Err(Error::EmptyAnnotation {
                disease: disease.to_string(),
            });
        }
        for row in self.phenotype.values() {
            row.band()?;
        }
        self.onset()?;
        Ok(())
    }
}

/// The disease-annotation provider seam.
pub trait DiseaseAnnotations: Sync {
    /// Every known disease, in a stable order.
    fn disease_ids(&self) -> Vec<DiseaseId>;

    fn disease(&self, id: &DiseaseId) -> Option<&DiseaseAnnotation>;

    /// Every annotated term of every disease.
    fn annotated_terms(&self) -> BTreeSet<TermId> {
        self.disease_ids()
            .iter()
            .filter_map(|id| self.disease(id))
            .flat_map(|d| d.phenotype.keys().cloned())
            .collect()
    }
}

/// In-memory annotation table keyed by disease id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    diseases: BTreeMap<DiseaseId, DiseaseAnnotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse `{disease_id: record}`. Disease ids are case-normalized.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, DiseaseAnnotation> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }

    pub fn insert(&mut self, id: DiseaseId, annotation: DiseaseAnnotation) {
        self.diseases.insert(id, annotation);
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DiseaseId, &DiseaseAnnotation)> {
        self.diseases.iter()
    }
}

impl<S: AsRef<str>> FromIterator<(S, DiseaseAnnotation)> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = (S, DiseaseAnnotation)>>(iter: I) -> Self {
        AnnotationSet {
            diseases: iter
                .into_iter()
                .map(|(id, record)| (DiseaseId::new(id), record))
                .collect(),
        }
    }
}

impl DiseaseAnnotations for AnnotationSet {
    fn disease_ids(&self) -> Vec<DiseaseId> {
        self.diseases.keys().cloned().collect()
    }

    fn disease(&self, id: &DiseaseId) -> Option<&DiseaseAnnotation> {
        self.diseases.get(id)
    }
}

/// Pool of terms eligible as noise: every annotated term plus its direct
/// parents, sorted and deduplicated.
pub fn eligible_terms<A, O>(annotations: &A, ontology: &O) -> Vec<TermId>
where
    A: DiseaseAnnotations + ?Sized,
    O: OntologyQuery + ?Sized,
{
    let annotated: Vec<TermId> = annotations.annotated_terms().into_iter().collect();
    let mut pool: BTreeSet<TermId> = ontology.ancestors(&annotated, 1);
    pool.extend(annotated);
    pool.into_iter().collect()
}
