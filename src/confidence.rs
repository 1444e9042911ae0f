// Confidence gate for classifier outputs
use crate::config::{ConfidenceConfig, DEFAULT_CONFIDENCE_THRESHOLD};

/// Rejects predictions whose top score falls below the threshold.
/// The threshold itself passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl From<&ConfidenceConfig> for ConfidenceGate {
    fn from(config: &ConfidenceConfig) -> Self {
        Self::new(config.threshold)
    }
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn passes(&self, score: f64) -> bool {
        score >= self.threshold
    }
}
