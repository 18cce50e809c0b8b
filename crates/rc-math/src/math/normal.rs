//! Normal (Gaussian) variates.
//!
//! Uses the Box–Muller transform on an open unit draw so the logarithm is
//! always finite.

use rand::distr::Open01;
use rand::Rng;
use std::f64::consts::PI;

/// Draw from N(0, 1).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Draw from N(mean, sigma²).
///
/// A zero `sigma` returns `mean` exactly; a negative `sigma` is treated as
/// its magnitude.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    mean + sigma.abs() * standard_normal(rng)
}

/// Density of N(mean, sigma²) at x.
pub fn normal_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || x.is_nan() {
        return f64::NAN;
    }
    let z = (x - mean) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_sigma_is_degenerate() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample_normal(&mut rng, 6.5, 0.0), 6.5);
        }
    }

    #[test]
    fn moments_match() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| sample_normal(&mut rng, 10.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!((mean - 10.0).abs() < 0.05, "mean {}", mean);
        assert!((var - 4.0).abs() < 0.15, "variance {}", var);
    }

    #[test]
    fn samples_are_finite() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10_000 {
            assert!(standard_normal(&mut rng).is_finite());
        }
    }

    #[test]
    fn pdf_peak() {
        let peak = normal_pdf(0.0, 0.0, 1.0);
        assert!((peak - 0.398_942_280_401_432_7).abs() < 1e-12);
        assert!(normal_pdf(1.0, 0.0, -1.0).is_nan());
    }
}
