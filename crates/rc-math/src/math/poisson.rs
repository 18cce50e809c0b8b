//! Poisson variates.
//!
//! Small means use Knuth's multiplication method; means of 10 and above use
//! Hörmann's transformed rejection with squeeze (PTRS), which runs in
//! constant expected time.

use rand::Rng;

use super::stable::log_factorial;

const PTRS_THRESHOLD: f64 = 10.0;

/// Draw from Poisson(lambda).
///
/// Non-positive or non-finite `lambda` yields 0.
pub fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0;
    }
    if lambda < PTRS_THRESHOLD {
        knuth(rng, lambda)
    } else {
        ptrs(rng, lambda)
    }
}

fn knuth<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    let limit = (-lambda).exp();
    let mut k = 0u64;
    let mut prod: f64 = rng.random();
    while prod > limit {
        k += 1;
        prod *= rng.random::<f64>();
    }
    k
}

fn ptrs<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    let slam = lambda.sqrt();
    let loglam = lambda.ln();
    let b = 0.931 + 2.53 * slam;
    let a = -0.059 + 0.02483 * b;
    let inv_alpha = 1.1239 + 1.1328 / (b - 3.4);
    let v_r = 0.9277 - 3.6224 / (b - 2.0);

    loop {
        let u = rng.random::<f64>() - 0.5;
        let v: f64 = rng.random();
        let us = 0.5 - u.abs();
        let k = ((2.0 * a / us + b) * u + lambda + 0.43).floor();

        if us >= 0.07 && v <= v_r {
            return k as u64;
        }
        if k < 0.0 || (us < 0.013 && v > us) {
            continue;
        }
        let lhs = v.ln() + inv_alpha.ln() - (a / (us * us) + b).ln();
        let rhs = -lambda + k * loglam - log_factorial(k as u64);
        if lhs <= rhs {
            return k as u64;
        }
    }
}

/// log P(X = k) for X ~ Poisson(lambda).
pub fn poisson_log_pmf(k: u64, lambda: f64) -> f64 {
    if lambda < 0.0 || lambda.is_nan() {
        return f64::NAN;
    }
    if lambda == 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    -lambda + (k as f64) * lambda.ln() - log_factorial(k)
}
