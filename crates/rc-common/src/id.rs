//! Term, disease, patient and subject identity types.
//!
//! Term and disease ids are opaque CURIE-like strings (`HP:0000118`,
//! `ORPHA:558`). Patient and subject ids are UUID v4 values rendered as 32
//! lowercase hex characters, unique within a run.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result, SamplingStage};

/// Ontology term identifier, e.g. `HP:0001250`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    pub fn new(id: impl Into<String>) -> Self {
        TermId(id.into())
    }

    /// Parse and validate a `PREFIX:LOCAL` identifier.
    ///
    /// Surrounding whitespace is trimmed; both halves must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (prefix, local) = s.split_once(':')?;
        if prefix.is_empty() || local.is_empty() || local.contains(':') {
            return None;
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(TermId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TermId {
    fn from(id: &str) -> Self {
        TermId(id.to_string())
    }
}

impl Borrow<str> for TermId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Disease identifier, e.g. `ORPHA:558` or `OMIM:154700`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseId(String);

impl DiseaseId {
    /// Disease ids are case-normalized to upper case, matching how the
    /// annotation sources key their records.
    pub fn new(id: impl AsRef<str>) -> Self {
        DiseaseId(id.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DiseaseId {
    fn from(id: &str) -> Self {
        DiseaseId::new(id)
    }
}

impl Borrow<str> for DiseaseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Draw a UUID v4 from `rng` and render it as simple (dash-less) hex.
fn uuid_hex_from_rng<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .simple()
        .to_string()
}

/// Identifier of one simulated patient record (one phenopacket).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl PatientId {
    /// Generate a new id from the operating system RNG.
    pub fn random() -> Self {
        PatientId(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Generate a new id from a caller-provided RNG (reproducible runs).
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        PatientId(uuid_hex_from_rng(rng))
    }

    /// Parse an existing id: exactly 32 lowercase hex characters.
    pub fn parse(s: &str) -> Option<Self> {
        is_simple_uuid(s).then(|| PatientId(s.to_string()))
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one synthetic subject.
///
/// A subject occupies one patient slot index and appears once per disease in
/// a run, so several patient records share the same subject id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn random() -> Self {
        SubjectId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        SubjectId(uuid_hex_from_rng(rng))
    }

    pub fn parse(s: &str) -> Option<Self> {
        is_simple_uuid(s).then(|| SubjectId(s.to_string()))
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_simple_uuid(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Maximum redraws before identifier allocation gives up.
pub const MAX_ID_REDRAWS: usize = 64;

/// Issues identifiers that are unique within one run.
///
/// Uniqueness is enforced by redrawing on collision rather than by a counter,
/// so ids stay opaque random values.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw candidates until one has not been issued before.
    pub fn allocate_with<F>(&mut self, mut draw: F) -> Result<String>
    where
        F: FnMut() -> String,
    {
        for _ in 0..MAX_ID_REDRAWS {
            let candidate = draw();
            if self.issued.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(Error::SamplingExhausted {
            stage: SamplingStage::Identifier,
            attempts: MAX_ID_REDRAWS,
        })
    }

    pub fn patient_id<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<PatientId> {
        self.allocate_with(|| uuid_hex_from_rng(rng)).map(PatientId)
    }

    pub fn subject_id<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<SubjectId> {
        self.allocate_with(|| uuid_hex_from_rng(rng)).map(SubjectId)
    }

    /// Number of ids issued so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
