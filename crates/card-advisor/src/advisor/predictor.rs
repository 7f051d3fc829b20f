//! Eligibility model port and the logistic-regression artifact that
//! backs it in production.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Binary approval classifier: fixed-order feature vector in, class-1
/// probability out. The ranking engine calls this once per request and
/// broadcasts the probability to every eligible card.
pub trait EligibilityPredictor: Send + Sync {
    fn approval_probability(&self, features: &[f64]) -> f64;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read eligibility model: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid eligibility model data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("eligibility model declares no feature weights")]
    EmptyWeights,
}

/// Logistic regression coefficients exported from the training
/// pipeline as a JSON sidecar.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticEligibilityModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticEligibilityModel {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Result<Self, ModelError> {
        if weights.is_empty() {
            return Err(ModelError::EmptyWeights);
        }
        Ok(Self { weights, intercept })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let model: LogisticEligibilityModel = serde_json::from_reader(reader)?;
        if model.weights.is_empty() {
            return Err(ModelError::EmptyWeights);
        }
        Ok(model)
    }
}

impl EligibilityPredictor for LogisticEligibilityModel {
    fn approval_probability(&self, features: &[f64]) -> f64 {
        let logit: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(weight, feature)| weight * feature)
            .sum::<f64>()
            + self.intercept;

        1.0 / (1.0 + (-logit).exp())
    }
}
