//! Drift detection module
//!
//! Two-sample tests that compare the distribution of a feature in a
//! reference sample (train) against a current sample (test).

mod ks;

pub use ks::{ordinal_ranks, KolmogorovSmirnovTest};

use crate::error::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Drift detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResult {
    /// Whether drift was detected
    pub drift_detected: bool,
    /// Test statistic
    pub score: f64,
    /// P-value (if applicable)
    pub p_value: Option<f64>,
    /// Significance level used for detection
    pub threshold: f64,
    /// Drift severity (0=none, 1=warning, 2=critical)
    pub severity: u8,
    /// Additional information
    pub message: String,
}

impl DriftResult {
    /// Create a result indicating no drift
    pub fn no_drift(score: f64, threshold: f64) -> Self {
        Self {
            drift_detected: false,
            score,
            p_value: None,
            threshold,
            severity: 0,
            message: "No drift detected".to_string(),
        }
    }

    /// Create a result indicating drift
    pub fn drift(score: f64, threshold: f64, severity: u8, message: &str) -> Self {
        Self {
            drift_detected: true,
            score,
            p_value: None,
            threshold,
            severity,
            message: message.to_string(),
        }
    }

    pub fn with_p_value(mut self, p_value: f64) -> Self {
        self.p_value = Some(p_value);
        self
    }
}

/// Trait for drift detectors
pub trait DriftDetector: Send + Sync {
    /// Detect drift between reference and test data
    fn detect(&self, reference: &Array1<f64>, test: &Array1<f64>) -> Result<DriftResult>;

    /// Get the threshold used for detection
    fn threshold(&self) -> f64;
}
