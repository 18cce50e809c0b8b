//! Stochastic patient generator.
//!
//! A patient is sampled from a disease's annotation in three phenotype passes
//! and one age pass:
//!
//! 1. Base selection: each annotated term is kept with a probability drawn
//!    from its frequency band. The pass is repeated until non-empty.
//! 2. Imprecision: each kept term may be replaced by one of its ancestors,
//!    `k ~ Poisson(imprecision)` hops up.
//! 3. Noise: up to `round(|S| * noise_ratio)` unrelated eligible terms are
//!    added, disjoint from the phenotype.
//! 4. Age: onset drawn from a truncated normal over the onset interval plus a
//!    Gumbel-distributed delay to the clinical visit.
//!
//! Every rejection loop is capped by `SamplingLimits`.

use rand::seq::index;
use rand::Rng;
use rc_common::{DiseaseId, Error, FrequencyBand, Result, SamplingStage, TermId};
use rc_config::SamplingConfig;
use rc_math::{round_half_up, sample_gumbel, sample_normal, sample_poisson, RejectionSampler};
use std::collections::BTreeSet;

use crate::annotation::{DiseaseAnnotation, PhenotypeAnnotation};
use crate::ontology::OntologyQuery;
use crate::onset::OnsetInterval;

/// `Phenotypic abnormality`: too generic to be a useful generalization.
pub const PHENOTYPIC_ABNORMALITY: &str = "HP:0000118";
/// `All`: the HPO root.
pub const HPO_ROOT: &str = "HP:0000001";

/// Mode of the time-to-visit distribution, in weeks.
const VISIT_MODE_WEEKS: f64 = 2.0;
const VISIT_SCALE_WEEKS: f64 = 1.0;
const WEEKS_PER_YEAR: f64 = 365.0 / 7.0;

/// Sigma (years) used when only a lower onset bound is known.
const OPEN_ONSET_SIGMA: f64 = 5.0;
/// Relative slack on each side of the onset interval.
const ONSET_SLACK: f64 = 0.1;

/// One sampled patient before identifiers are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPatient {
    pub phenotype: BTreeSet<TermId>,
    /// Age at visit in years; `None` when the onset is undefined.
    pub age: Option<f64>,
}

/// Samples patients for any disease against a fixed ontology and config.
pub struct PatientSampler<'a, O: OntologyQuery + ?Sized> {
    ontology: &'a O,
    config: &'a SamplingConfig,
    eligible: &'a [TermId],
}

impl<'a, O: OntologyQuery + ?Sized> PatientSampler<'a, O> {
    /// `eligible` is the noise pool, usually from `annotation::eligible_terms`.
    pub fn new(ontology: &'a O, config: &'a SamplingConfig, eligible: &'a [TermId]) -> Self {
        Self {
            ontology,
            config,
            eligible,
        }
    }

    pub fn config(&self) -> &SamplingConfig {
        self.config
    }

    /// Sample one patient. `onset` is the disease's folded onset interval.
    pub fn sample_patient<R: Rng + ?Sized>(
        &self,
        id: &DiseaseId,
        disease: &DiseaseAnnotation,
        onset: OnsetInterval,
        rng: &mut R,
    ) -> Result<SampledPatient> {
        let phenotype = self.sample_phenotype(id, disease, rng)?;
        let age = self.sample_age(onset, rng)?;
        Ok(SampledPatient { phenotype, age })
    }

    /// Base selection, imprecision and noise.
    pub fn sample_phenotype<R: Rng + ?Sized>(
        &self,
        id: &DiseaseId,
        disease: &DiseaseAnnotation,
        rng: &mut R,
    ) -> Result<BTreeSet<TermId>> {
        if disease.phenotype.is_empty() {
            return Err(Error::EmptyAnnotation {
                disease: id.to_string(),
            });
        }

        let base: BTreeSet<TermId> = if self.config.omit_frequency {
            disease.phenotype.keys().cloned().collect()
        } else {
            self.select_base(disease, rng)?
        };

        let mut phenotype = self.generalize(&base, rng);
        let noise = self.noise(&phenotype, rng);
        phenotype.extend(noise);
        Ok(phenotype)
    }

    fn select_base<R: Rng + ?Sized>(
        &self,
        disease: &DiseaseAnnotation,
        rng: &mut R,
    ) -> Result<BTreeSet<TermId>> {
        let attempts = self.config.limits.max_symptom_attempts.max(1);
        for _ in 0..attempts {
            let mut selected = BTreeSet::new();
            for (term, row) in &disease.phenotype {
                let band = self.resolve_band(row, rng)?;
                // The comparison draw comes first, then the threshold draw.
                let draw: f64 = rng.random();
                let threshold = band.interval().threshold(rng.random());
                if draw < threshold {
                    selected.insert(term.clone());
                }
            }
            if !selected.is_empty() {
                return Ok(selected);
            }
        }
        Err(Error::SamplingExhausted {
            stage: SamplingStage::Symptoms,
            attempts,
        })
    }

    /// Explicit band, then the diagnostic-criterion fallback, then the default.
    fn resolve_band<R: Rng + ?Sized>(
        &self,
        row: &PhenotypeAnnotation,
        rng: &mut R,
    ) -> Result<FrequencyBand> {
        if let Some(band) = row.band()? {
            return Ok(band);
        }
        if row.is_diagnostic_criterion() {
            return Ok(self.config.dx_criteria_frequency);
        }
        match self.config.default_frequency.candidates() {
            [] => Err(Error::InvalidConfig(
                "default_frequency has no candidates".to_string(),
            )),
            [only] => Ok(*only),
            many => Ok(many[rng.random_range(0..many.len())]),
        }
    }

    /// Replace terms by ancestors `k ~ Poisson(lambda)` hops up.
    fn generalize<R: Rng + ?Sized>(
        &self,
        terms: &BTreeSet<TermId>,
        rng: &mut R,
    ) -> BTreeSet<TermId> {
        let lambda = self.config.poisson_lambda();
        if lambda == 0.0 {
            return terms.clone();
        }
        terms
            .iter()
            .map(|term| {
                let k = sample_poisson(rng, lambda) as usize;
                self.generalize_term(term, k)
            })
            .collect()
    }

    fn generalize_term(&self, term: &TermId, k: usize) -> TermId {
        if k == 0 {
            return term.clone();
        }
        let root = self.ontology.root();
        let candidates: Vec<TermId> = self
            .ontology
            .ancestors_ranked(term, k)
            .into_iter()
            .filter(|a| a != root && a.as_str() != PHENOTYPIC_ABNORMALITY && a.as_str() != HPO_ROOT)
            .collect();
        match candidates.len() {
            0 => term.clone(),
            len => candidates[(k - 1).min(len - 1)].clone(),
        }
    }

    /// Distinct eligible terms disjoint from `phenotype`, drawn without
    /// replacement from the pool minus the phenotype.
    fn noise<R: Rng + ?Sized>(
        &self,
        phenotype: &BTreeSet<TermId>,
        rng: &mut R,
    ) -> BTreeSet<TermId> {
        if self.config.noise_ratio <= 0.0 || self.eligible.is_empty() {
            return BTreeSet::new();
        }

        let max_noise = round_half_up(phenotype.len() as f64 * self.config.noise_ratio);
        let count = rng.random_range(0..=max_noise);
        let available: Vec<&TermId> = self
            .eligible
            .iter()
            .filter(|t| !phenotype.contains(*t))
            .collect();
        let count = count.min(available.len());

        index::sample(rng, available.len(), count)
            .into_iter()
            .map(|i| available[i].clone())
            .collect()
    }

    /// Onset plus time to visit, in years.
    pub fn sample_age<R: Rng + ?Sized>(
        &self,
        onset: OnsetInterval,
        rng: &mut R,
    ) -> Result<Option<f64>> {
        let Some(onset) = self.sample_onset(onset, rng)? else {
            return Ok(None);
        };
        let visit = self.sample_visit(rng)?;
        Ok(Some(onset + visit))
    }

    /// `None` when neither bound, or only the upper bound, is known.
    pub fn sample_onset<R: Rng + ?Sized>(
        &self,
        onset: OnsetInterval,
        rng: &mut R,
    ) -> Result<Option<f64>> {
        let sampler = RejectionSampler::new(self.config.limits.max_age_attempts);
        let exhausted = |e: rc_math::Exhausted| Error::SamplingExhausted {
            stage: SamplingStage::Onset,
            attempts: e.attempts,
        };
        match (onset.min, onset.max) {
            (Some(a), Some(b)) => {
                let sigma = (b - a) / 2.0;
                let mean = a + sigma;
                let (lo, hi) = ((1.0 - ONSET_SLACK) * a, (1.0 + ONSET_SLACK) * b);
                sampler
                    .sample(|| sample_normal(rng, mean, sigma), |x| *x >= lo && *x <= hi)
                    .map(Some)
                    .map_err(exhausted)
            }
            (Some(a), None) => {
                let lo = (1.0 - ONSET_SLACK) * a;
                sampler
                    .sample(
                        || sample_normal(rng, a + OPEN_ONSET_SIGMA, OPEN_ONSET_SIGMA),
                        |x| *x >= lo,
                    )
                    .map(Some)
                    .map_err(exhausted)
            }
            _ => Ok(None),
        }
    }

    /// Time from symptom discovery to visit, in years.
    pub fn sample_visit<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        RejectionSampler::new(self.config.limits.max_age_attempts)
            .sample(
                || sample_gumbel(rng, VISIT_MODE_WEEKS, VISIT_SCALE_WEEKS),
                |v| VISIT_MODE_WEEKS + v >= 0.0,
            )
            .map(|weeks| weeks / WEEKS_PER_YEAR)
            .map_err(|e| Error::SamplingExhausted {
                stage: SamplingStage::Visit,
                attempts: e.attempts,
            })
    }
}
