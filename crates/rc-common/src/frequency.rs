//! Canonical phenotype frequency bands.
//!
//! The six HPO frequency terms (subontology `HP:0040279`) each carry a fixed
//! closed probability interval. The table is process-wide and immutable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Closed probability interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyInterval {
    pub min: f64,
    pub max: f64,
}

impl FrequencyInterval {
    /// Map a unit draw `u` in `[0, 1)` onto the interval: `(max - min) * u + min`.
    pub fn threshold(&self, u: f64) -> f64 {
        (self.max - self.min) * u + self.min
    }

    pub fn contains(&self, p: f64) -> bool {
        p >= self.min && p <= self.max
    }
}

/// One of the six canonical frequency bands, ordered from most to least
/// prevalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencyBand {
    /// Always present (100%).
    Obligate,
    /// 80-99%.
    VeryFrequent,
    /// 30-79%.
    Frequent,
    /// 5-29%.
    Occasional,
    /// 1-4%.
    VeryRare,
    /// Never present (0%).
    Excluded,
}

impl FrequencyBand {
    /// All bands in canonical order (obligate first).
    pub const ALL: [FrequencyBand; 6] = [
        FrequencyBand::Obligate,
        FrequencyBand::VeryFrequent,
        FrequencyBand::Frequent,
        FrequencyBand::Occasional,
        FrequencyBand::VeryRare,
        FrequencyBand::Excluded,
    ];

    /// HPO term id of the band.
    pub fn id(self) -> &'static str {
        match self {
            FrequencyBand::Obligate => "HP:0040280",
            FrequencyBand::VeryFrequent => "HP:0040281",
            FrequencyBand::Frequent => "HP:0040282",
            FrequencyBand::Occasional => "HP:0040283",
            FrequencyBand::VeryRare => "HP:0040284",
            FrequencyBand::Excluded => "HP:0040285",
        }
    }

    /// Lower-case display name of the band.
    pub fn name(self) -> &'static str {
        match self {
            FrequencyBand::Obligate => "obligate",
            FrequencyBand::VeryFrequent => "very frequent",
            FrequencyBand::Frequent => "frequent",
            FrequencyBand::Occasional => "occasional",
            FrequencyBand::VeryRare => "very rare",
            FrequencyBand::Excluded => "excluded",
        }
    }

    pub fn interval(self) -> FrequencyInterval {
        let (min, max) = match self {
            FrequencyBand::Obligate => (1.00, 1.00),
            FrequencyBand::VeryFrequent => (0.80, 0.99),
            FrequencyBand::Frequent => (0.30, 0.79),
            FrequencyBand::Occasional => (0.05, 0.29),
            FrequencyBand::VeryRare => (0.01, 0.04),
            FrequencyBand::Excluded => (0.00, 0.00),
        };
        FrequencyInterval { min, max }
    }

    /// Look a band up by HPO term id.
    pub fn from_id(id: &str) -> Result<Self, Error> {
        match id.trim() {
            "HP:0040280" => Ok(FrequencyBand::Obligate),
            "HP:0040281" => Ok(FrequencyBand::VeryFrequent),
            "HP:0040282" => Ok(FrequencyBand::Frequent),
            "HP:0040283" => Ok(FrequencyBand::Occasional),
            "HP:0040284" => Ok(FrequencyBand::VeryRare),
            "HP:0040285" => Ok(FrequencyBand::Excluded),
            _ => Err(Error::UnknownFrequencyBand {
                value: id.to_string(),
            }),
        }
    }

    /// Look a band up by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.trim().to_lowercase().as_str() {
            "obligate" => Ok(FrequencyBand::Obligate),
            "very frequent" => Ok(FrequencyBand::VeryFrequent),
            "frequent" => Ok(FrequencyBand::Frequent),
            "occasional" => Ok(FrequencyBand::Occasional),
            "very rare" => Ok(FrequencyBand::VeryRare),
            "excluded" => Ok(FrequencyBand::Excluded),
            _ => Err(Error::UnknownFrequencyBand {
                value: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts either the term id or the band name.
impl FromStr for FrequencyBand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrequencyBand::from_id(s).or_else(|_| FrequencyBand::from_name(s))
    }
}

impl Serialize for FrequencyBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for FrequencyBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
