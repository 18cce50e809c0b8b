//! Gumbel (type I extreme value) distribution.
//!
//! Parameterized by location `mu` (the mode) and scale `beta > 0`:
//! `F(x) = exp(-exp(-(x - mu) / beta))`.

use rand::distr::Open01;
use rand::Rng;

/// CDF of Gumbel(mu, beta) at x.
pub fn gumbel_cdf(x: f64, mu: f64, beta: f64) -> f64 {
    if beta <= 0.0 || x.is_nan() {
        return f64::NAN;
    }
    (-(-(x - mu) / beta).exp()).exp()
}

/// Quantile (inverse CDF) of Gumbel(mu, beta) for p in (0, 1).
pub fn gumbel_quantile(p: f64, mu: f64, beta: f64) -> f64 {
    if beta <= 0.0 || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    mu - beta * (-p.ln()).ln()
}

/// Draw from Gumbel(mu, beta) by inversion.
pub fn sample_gumbel<R: Rng + ?Sized>(rng: &mut R, mu: f64, beta: f64) -> f64 {
    let u: f64 = rng.sample(Open01);
    gumbel_quantile(u, mu, beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

    #[test]
    fn cdf_at_mode() {
        // F(mu) = exp(-1)
        let f = gumbel_cdf(2.0, 2.0, 1.0);
        assert!((f - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn quantile_inverts_cdf() {
        for &p in &[0.01, 0.2, 0.5, 0.8, 0.99] {
            let x = gumbel_quantile(p, 2.0, 1.0);
            assert!((gumbel_cdf(x, 2.0, 1.0) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn sample_mean_matches() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 50_000;
        let mean = (0..n).map(|_| sample_gumbel(&mut rng, 2.0, 1.0)).sum::<f64>() / n as f64;
        // E[X] = mu + beta * gamma
        assert!((mean - (2.0 + EULER_GAMMA)).abs() < 0.03, "mean {}", mean);
    }

    #[test]
    fn invalid_scale_is_nan() {
        assert!(gumbel_cdf(0.0, 0.0, 0.0).is_nan());
        assert!(gumbel_quantile(0.5, 0.0, -1.0).is_nan());
        assert!(gumbel_quantile(1.5, 0.0, 1.0).is_nan());
    }
}
