use super::{DriftDetector, DriftResult};
use crate::error::{AutoSenseError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Two-sample Kolmogorov-Smirnov test
///
/// Drift is flagged when the asymptotic p-value falls below `alpha`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KolmogorovSmirnovTest {
    /// Significance level (alpha)
    alpha: f64,
}

impl KolmogorovSmirnovTest {
    /// Create new KS test; `alpha` is clamped to (0, 1)
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(1e-6, 1.0 - 1e-6),
        }
    }

    /// Sup-norm distance between the two empirical CDFs
    pub fn statistic(reference: &[f64], test: &[f64]) -> f64 {
        let r = sorted(reference);
        let t = sorted(test);
        let (n1, n2) = (r.len() as f64, t.len() as f64);

        r.iter()
            .chain(t.iter())
            .map(|&x| {
                let f1 = r.partition_point(|&v| v <= x) as f64 / n1;
                let f2 = t.partition_point(|&v| v <= x) as f64 / n2;
                (f1 - f2).abs()
            })
            .fold(0.0, f64::max)
    }

    /// Asymptotic two-sided p-value for statistic `d` with sample sizes `n1`, `n2`
    pub fn p_value(d: f64, n1: usize, n2: usize) -> f64 {
        let ne = (n1 * n2) as f64 / (n1 + n2) as f64;
        let sqrt_ne = ne.sqrt();
        let lambda = (sqrt_ne + 0.12 + 0.11 / sqrt_ne) * d;
        kolmogorov_survival(lambda).clamp(0.0, 1.0)
    }
}

impl Default for KolmogorovSmirnovTest {
    fn default() -> Self {
        Self::new(0.05)
    }
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

/// Q_KS(λ) = 2 Σ (-1)^(j-1) exp(-2 j² λ²)
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda < 0.2 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;
    for j in 1..=100 {
        let j = j as f64;
        let term = sign * (a2 * j * j).exp();
        sum += term;
        if term.abs() <= 1e-3 * previous || term.abs() <= 1e-8 * sum {
            return sum;
        }
        sign = -sign;
        previous = term.abs();
    }
    // no convergence only happens for tiny lambda
    1.0
}

impl DriftDetector for KolmogorovSmirnovTest {
    fn detect(&self, reference: &Array1<f64>, test: &Array1<f64>) -> Result<DriftResult> {
        if reference.is_empty() || test.is_empty() {
            return Err(AutoSenseError::ValidationError(
                "Empty arrays provided".to_string(),
            ));
        }

        let reference: Vec<f64> = reference.iter().copied().collect();
        let test: Vec<f64> = test.iter().copied().collect();
        let d = Self::statistic(&reference, &test);
        let p = Self::p_value(d, reference.len(), test.len());

        let result = if p < self.alpha {
            let severity = if p < self.alpha / 10.0 { 2 } else { 1 };
            DriftResult::drift(
                d,
                self.alpha,
                severity,
                &format!("KS p-value ({:.4}) below alpha ({:.4})", p, self.alpha),
            )
        } else {
            DriftResult::no_drift(d, self.alpha)
        };
        Ok(result.with_p_value(p))
    }

    fn threshold(&self) -> f64 {
        self.alpha
    }
}

/// Map two categorical samples onto ordinal ranks over their sorted union
pub fn ordinal_ranks(reference: &[String], test: &[String]) -> (Vec<f64>, Vec<f64>) {
    let mut union: Vec<&str> = reference.iter().chain(test.iter()).map(String::as_str).collect();
    union.sort_unstable();
    union.dedup();

    let rank = |s: &String| union.binary_search(&s.as_str()).unwrap_or(0) as f64;
    (
        reference.iter().map(rank).collect(),
        test.iter().map(rank).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn normal(n: usize, mean: f64, seed: u64) -> Array1<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array1::from_iter((0..n).map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen();
            mean + (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
        }))
    }

    #[test]
    fn test_statistic_known_values() {
        assert_eq!(KolmogorovSmirnovTest::statistic(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(KolmogorovSmirnovTest::statistic(&[1.0, 2.0], &[3.0, 4.0]), 1.0);
        let d = KolmogorovSmirnovTest::statistic(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0]);
        assert!((d - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(KolmogorovSmirnovTest::p_value(0.0, 100, 100), 1.0);
        let p = KolmogorovSmirnovTest::p_value(1.0, 1000, 1000);
        assert!(p < 1e-10);
        let mid = KolmogorovSmirnovTest::p_value(0.1, 200, 200);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_same_distribution_rarely_drifts() {
        let ks = KolmogorovSmirnovTest::default();
        let passing = (0..20u64)
            .filter(|&seed| {
                let a = normal(1000, 0.0, seed);
                let b = normal(1000, 0.0, seed + 1000);
                !ks.detect(&a, &b).unwrap().drift_detected
            })
            .count();
        assert!(passing >= 14, "only {} of 20 same-distribution pairs passed", passing);
    }

    #[test]
    fn test_shifted_distribution_drifts() {
        let ks = KolmogorovSmirnovTest::default();
        let result = ks.detect(&normal(1000, 0.0, 1), &normal(1000, 5.0, 2)).unwrap();
        assert!(result.drift_detected);
        assert_eq!(result.severity, 2);
        assert!(result.p_value.unwrap() < 0.05);
    }

    #[test]
    fn test_empty_input_rejected() {
        let ks = KolmogorovSmirnovTest::default();
        assert!(ks.detect(&Array1::zeros(0), &Array1::ones(3)).is_err());
    }

    #[test]
    fn test_ordinal_ranks() {
        let a = vec!["kia".to_string(), "audi".to_string()];
        let b = vec!["ford".to_string()];
        let (ra, rb) = ordinal_ranks(&a, &b);
        assert_eq!(ra, vec![2.0, 0.0]);
        assert_eq!(rb, vec![1.0]);
    }
}
