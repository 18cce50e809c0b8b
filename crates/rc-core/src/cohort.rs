//! Cohort assembly across diseases.
//!
//! The assembler runs the patient sampler N times per requested disease and
//! then stamps identifiers on the results:
//!
//! - Every patient record gets a run-unique patient id.
//! - Every slot index `i` gets one subject id, shared by the i-th patient of
//!   every disease.
//!
//! A seeded run is fully deterministic. The master RNG derives one
//! independent stream per disease in request order, and identifiers are drawn
//! from the master RNG only after all sampling is done. Sampling diseases in
//! parallel therefore yields the same run as sampling them serially.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rc_common::{
    DiseaseId, Error, IdAllocator, PatientId, Result, StructuredError, SubjectId, TermId,
    SCHEMA_VERSION,
};
use rc_config::{SamplingConfig, SamplingSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::annotation::{eligible_terms, DiseaseAnnotation, DiseaseAnnotations, PhenotypeAnnotation};
use crate::generator::{PatientSampler, SampledPatient};
use crate::logging::event_names;
use crate::ontology::OntologyQuery;
use crate::onset::OnsetInterval;

/// What to simulate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortRequest {
    /// Diseases to sample; empty means every known disease.
    #[serde(default)]
    pub diseases: Vec<DiseaseId>,

    pub patients_per_disease: usize,

    /// Makes the run reproducible, identifiers included.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Sample diseases on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

impl CohortRequest {
    pub fn new(patients_per_disease: usize) -> Self {
        CohortRequest {
            patients_per_disease,
            ..Self::default()
        }
    }

    pub fn with_diseases(mut self, diseases: impl IntoIterator<Item = DiseaseId>) -> Self {
        self.diseases = diseases.into_iter().collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// One synthetic patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub subject_id: SubjectId,
    /// Slot index within the cohort.
    pub slot: usize,
    pub phenotype: BTreeSet<TermId>,
    /// Age at visit in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
}

/// The patients sampled for one disease, with the source annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub disease_id: DiseaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The annotated phenotype-frequency table the cohort was drawn from.
    #[serde(default)]
    pub phenotype: BTreeMap<TermId, PhenotypeAnnotation>,
    pub onset: OnsetInterval,
    pub patients: Vec<Patient>,
}

/// Per-disease result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseOutcome {
    pub disease_id: DiseaseId,
    pub generated: usize,
    pub skipped: usize,
    /// Set when the whole disease was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StructuredError>,
    /// Errors of individually skipped patients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patient_errors: Vec<StructuredError>,
}

impl DiseaseOutcome {
    pub fn is_skipped(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals and per-disease outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub diseases_requested: usize,
    pub diseases_sampled: usize,
    pub diseases_skipped: usize,
    pub patients_generated: usize,
    pub patients_skipped: usize,
    pub outcomes: Vec<DiseaseOutcome>,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<DiseaseOutcome>) -> Self {
        let diseases_skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        RunSummary {
            diseases_requested: outcomes.len(),
            diseases_sampled: outcomes.len() - diseases_skipped,
            diseases_skipped,
            patients_generated: outcomes.iter().map(|o| o.generated).sum(),
            patients_skipped: outcomes.iter().map(|o| o.skipped).sum(),
            outcomes,
        }
    }

    /// True when anything at all was skipped.
    pub fn is_partial(&self) -> bool {
        self.diseases_skipped > 0 || self.patients_skipped > 0
    }
}

/// Cohorts plus summary, before run metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCohorts {
    pub cohorts: Vec<Cohort>,
    pub summary: RunSummary,
}

/// A complete, serializable simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub schema_version: String,
    pub run_id: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub config: SamplingSnapshot,
    pub cohorts: Vec<Cohort>,
    pub summary: RunSummary,
}

impl SimulationRun {
    pub fn new(
        run_id: impl Into<String>,
        seed: Option<u64>,
        config: SamplingSnapshot,
        assembled: AssembledCohorts,
    ) -> Self {
        SimulationRun {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: run_id.into(),
            created: Utc::now(),
            seed,
            config,
            cohorts: assembled.cohorts,
            summary: assembled.summary,
        }
    }

    pub fn patients(&self) -> impl Iterator<Item = (&Cohort, &Patient)> {
        self.cohorts
            .iter()
            .flat_map(|c| c.patients.iter().map(move |p| (c, p)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sampling result of one disease before ids are assigned.
struct DiseaseDraw<'a> {
    disease_id: DiseaseId,
    annotation: Option<&'a DiseaseAnnotation>,
    onset: OnsetInterval,
    result: std::result::Result<Vec<(usize, SampledPatient)>, Error>,
    patient_errors: Vec<StructuredError>,
}

/// Drives the patient sampler across diseases.
pub struct CohortAssembler<'a, O, A>
where
    O: OntologyQuery + ?Sized,
    A: DiseaseAnnotations + ?Sized,
{
    ontology: &'a O,
    annotations: &'a A,
    config: &'a SamplingConfig,
    eligible: Vec<TermId>,
}

impl<'a, O, A> CohortAssembler<'a, O, A>
where
    O: OntologyQuery + ?Sized,
    A: DiseaseAnnotations + ?Sized,
{
    /// Builds the noise pool from every annotated term once.
    pub fn new(ontology: &'a O, annotations: &'a A, config: &'a SamplingConfig) -> Self {
        let eligible = eligible_terms(annotations, ontology);
        debug!(eligible = eligible.len(), "noise pool built");
        Self {
            ontology,
            annotations,
            config,
            eligible,
        }
    }

    pub fn eligible(&self) -> &[TermId] {
        &self.eligible
    }

    /// Sample every requested disease and assign identifiers.
    pub fn assemble(&self, request: &CohortRequest) -> Result<AssembledCohorts> {
        let diseases = if request.diseases.is_empty() {
            self.annotations.disease_ids()
        } else {
            request.diseases.clone()
        };

        let mut master = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let streams: Vec<(DiseaseId, u64)> = diseases
            .into_iter()
            .map(|id| (id, master.random()))
            .collect();

        let sampler = PatientSampler::new(self.ontology, self.config, &self.eligible);
        let n = request.patients_per_disease;
        let draws: Vec<DiseaseDraw<'_>> = if request.parallel {
            streams
                .into_par_iter()
                .map(|(id, seed)| self.sample_disease(&sampler, id, seed, n))
                .collect()
        } else {
            streams
                .into_iter()
                .map(|(id, seed)| self.sample_disease(&sampler, id, seed, n))
                .collect()
        };

        let mut ids = IdAllocator::new();
        let subjects = (0..n)
            .map(|_| ids.subject_id(&mut master))
            .collect::<Result<Vec<_>>>()?;

        let mut cohorts = Vec::with_capacity(draws.len());
        let mut outcomes = Vec::with_capacity(draws.len());
        for draw in draws {
            let (cohort, outcome) = finish_disease(draw, &subjects, &mut ids, &mut master, n)?;
            cohorts.push(cohort);
            outcomes.push(outcome);
        }

        Ok(AssembledCohorts {
            cohorts,
            summary: RunSummary::from_outcomes(outcomes),
        })
    }

    fn sample_disease(
        &self,
        sampler: &PatientSampler<'_, O>,
        disease_id: DiseaseId,
        seed: u64,
        n: usize,
    ) -> DiseaseDraw<'a> {
        let annotations: &'a A = self.annotations;
        let annotation = annotations.disease(&disease_id);
        let mut draw = DiseaseDraw {
            disease_id,
            annotation,
            onset: OnsetInterval::UNKNOWN,
            result: Ok(Vec::new()),
            patient_errors: Vec::new(),
        };

        let Some(record) = annotation else {
            draw.result = Err(Error::UnknownDisease {
                disease: draw.disease_id.to_string(),
            });
            return draw;
        };
        if let Err(e) = record.validate(&draw.disease_id) {
            draw.result = Err(e);
            return draw;
        }
        match record.onset() {
            Ok(onset) => draw.onset = onset,
            Err(e) => {
                draw.result = Err(e);
                return draw;
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut patients = Vec::with_capacity(n);
        for slot in 0..n {
            match sampler.sample_patient(&draw.disease_id, record, draw.onset, &mut rng) {
                Ok(patient) => patients.push((slot, patient)),
                Err(e) => {
                    debug!(disease = %draw.disease_id, slot, error = %e, "patient skipped");
                    draw.patient_errors.push(StructuredError::from(&e));
                }
            }
        }
        draw.result = Ok(patients);
        draw
    }
}

fn finish_disease(
    draw: DiseaseDraw<'_>,
    subjects: &[SubjectId],
    ids: &mut IdAllocator,
    master: &mut StdRng,
    n: usize,
) -> Result<(Cohort, DiseaseOutcome)> {
    let mut cohort = Cohort {
        disease_id: draw.disease_id.clone(),
        name: draw.annotation.and_then(|a| a.name.clone()),
        phenotype: draw
            .annotation
            .map(|a| a.phenotype.clone())
            .unwrap_or_default(),
        onset: draw.onset,
        patients: Vec::new(),
    };

    let sampled = match draw.result {
        Ok(sampled) => sampled,
        Err(e) => {
            warn!(
                event = event_names::COHORT_SKIPPED,
                disease = %draw.disease_id,
                code = e.code(),
                error = %e,
                "disease skipped"
            );
            let outcome = DiseaseOutcome {
                disease_id: draw.disease_id,
                generated: 0,
                skipped: n,
                error: Some(StructuredError::from(&e)),
                patient_errors: Vec::new(),
            };
            return Ok((cohort, outcome));
        }
    };

    for (slot, sample) in sampled {
        cohort.patients.push(Patient {
            id: ids.patient_id(master)?,
            subject_id: subjects[slot].clone(),
            slot,
            phenotype: sample.phenotype,
            age: sample.age,
        });
    }

    let generated = cohort.patients.len();
    info!(
        event = event_names::COHORT_SAMPLED,
        disease = %cohort.disease_id,
        generated,
        skipped = n - generated,
        "cohort sampled"
    );
    let outcome = DiseaseOutcome {
        disease_id: draw.disease_id,
        generated,
        skipped: n - generated,
        error: None,
        patient_errors: draw.patient_errors,
    };
    Ok((cohort, outcome))
}
