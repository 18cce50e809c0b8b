//! Age-of-onset intervals.
//!
//! Onset is annotated either as a named age class or as a numeric
//! `[min, max]` range in years. Several annotations on one disease are folded
//! into a single interval by union. A missing bound means unknown, and it
//! stays unknown through any union.

use rc_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named onset age class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeClass {
    /// Before birth.
    Antenatal,
    /// Birth to the fourth week of life.
    Neonatal,
    /// Fourth week to the 23rd month.
    Infancy,
    /// 2 to 11 years.
    Childhood,
    /// 12 to 18 years.
    Adolescent,
    /// 19 to 65 years.
    Adult,
    /// From 66 years.
    Elderly,
    AllAges,
    NoDataAvailable,
}

impl AgeClass {
    pub const ALL: [AgeClass; 9] = [
        AgeClass::Antenatal,
        AgeClass::Neonatal,
        AgeClass::Infancy,
        AgeClass::Childhood,
        AgeClass::Adolescent,
        AgeClass::Adult,
        AgeClass::Elderly,
        AgeClass::AllAges,
        AgeClass::NoDataAvailable,
    ];

    /// Case-insensitive token lookup.
    pub fn parse(token: &str) -> Result<Self> {
        match token.trim().to_lowercase().as_str() {
            "antenatal" => Ok(AgeClass::Antenatal),
            "neonatal" => Ok(AgeClass::Neonatal),
            "infancy" => Ok(AgeClass::Infancy),
            "childhood" => Ok(AgeClass::Childhood),
            "adolescent" => Ok(AgeClass::Adolescent),
            "adult" => Ok(AgeClass::Adult),
            "elderly" => Ok(AgeClass::Elderly),
            "all ages" => Ok(AgeClass::AllAges),
            "no data available" => Ok(AgeClass::NoDataAvailable),
            _ => Err(Error::UnknownAgeClass {
                value: token.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeClass::Antenatal => "antenatal",
            AgeClass::Neonatal => "neonatal",
            AgeClass::Infancy => "infancy",
            AgeClass::Childhood => "childhood",
            AgeClass::Adolescent => "adolescent",
            AgeClass::Adult => "adult",
            AgeClass::Elderly => "elderly",
            AgeClass::AllAges => "all ages",
            AgeClass::NoDataAvailable => "no data available",
        }
    }

    /// Interval in years.
    pub fn interval(self) -> OnsetInterval {
        match self {
            AgeClass::Antenatal => OnsetInterval::bounded(-6.0 / 12.0, 0.0),
            AgeClass::Neonatal => OnsetInterval::bounded(0.0, 1.0 / 12.0),
            AgeClass::Infancy => OnsetInterval::bounded(1.0 / 12.0, 2.0),
            AgeClass::Childhood => OnsetInterval::bounded(2.0, 11.0),
            AgeClass::Adolescent => OnsetInterval::bounded(12.0, 18.0),
            AgeClass::Adult => OnsetInterval::bounded(19.0, 65.0),
            AgeClass::Elderly => OnsetInterval::bounded(66.0, 90.0),
            AgeClass::AllAges => OnsetInterval::bounded(0.0, 90.0),
            AgeClass::NoDataAvailable => OnsetInterval::UNKNOWN,
        }
    }
}

impl fmt::Display for AgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AgeClass::parse(s)
    }
}

/// Onset interval in years; `None` marks an unknown bound.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OnsetInterval {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl OnsetInterval {
    pub const UNKNOWN: OnsetInterval = OnsetInterval {
        min: None,
        max: None,
    };

    pub fn bounded(min: f64, max: f64) -> Self {
        OnsetInterval {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Smallest min and largest max; an unknown bound on either side wins.
    pub fn union(self, other: OnsetInterval) -> OnsetInterval {
        OnsetInterval {
            min: match (self.min, other.min) {
                (Some(a), Some(b)) => Some(a.min(b)),
                _ => None,
            },
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
        }
    }

    /// Fold descriptors by union; no descriptors yields an unknown interval.
    pub fn from_descriptors(descriptors: &[OnsetDescriptor]) -> Result<OnsetInterval> {
        let mut iter = descriptors.iter();
        let Some(first) = iter.next() else {
            return Ok(OnsetInterval::UNKNOWN);
        };
        let mut acc = first.interval()?;
        for descriptor in iter {
            acc = acc.union(descriptor.interval()?);
        }
        Ok(acc)
    }
}

impl fmt::Display for OnsetInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<f64>| b.map_or_else(|| "?".to_string(), |v| format!("{:.3}", v));
        write!(f, "[{}, {}]", bound(self.min), bound(self.max))
    }
}

/// One onset annotation: an age-class token or a numeric range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OnsetDescriptor {
    Class(String),
    Range(Option<f64>, Option<f64>),
}

impl OnsetDescriptor {
    pub fn interval(&self) -> Result<OnsetInterval> {
        match self {
            OnsetDescriptor::Class(token) => Ok(AgeClass::parse(token)?.interval()),
            OnsetDescriptor::Range(min, max) => Ok(OnsetInterval {
                min: *min,
                max: *max,
            }),
        }
    }
}

impl From<AgeClass> for OnsetDescriptor {
    fn from(class: AgeClass) -> Self {
        OnsetDescriptor::Class(class.as_str().to_string())
    }
}
