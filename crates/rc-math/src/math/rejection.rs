//! Bounded rejection sampling.
//!
//! Every rejection loop in the sampler carries an attempt cap so that
//! pathological inputs fail loudly instead of spinning.

use std::fmt;

/// A rejection loop hit its attempt cap without an accepted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted {
    pub attempts: usize,
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no draw accepted after {} attempts", self.attempts)
    }
}

impl std::error::Error for Exhausted {}

/// Draw-until-accepted with a hard cap on attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionSampler {
    max_attempts: usize,
}

impl RejectionSampler {
    /// A cap of zero is raised to one so at least one draw is made.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Call `draw` until `accept` returns true for its value.
    pub fn sample<T, D, A>(&self, mut draw: D, mut accept: A) -> Result<T, Exhausted>
    where
        D: FnMut() -> T,
        A: FnMut(&T) -> bool,
    {
        for _ in 0..self.max_attempts {
            let candidate = draw();
            if accept(&candidate) {
                return Ok(candidate);
            }
        }
        Err(Exhausted {
            attempts: self.max_attempts,
        })
    }
}
