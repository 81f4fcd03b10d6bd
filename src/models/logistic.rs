//! Portable logistic regression artifact
//!
//! JSON export of a fitted linear classifier:
//! `{"model_name": "...", "weights": [...], "bias": 0.0, "threshold": 0.5}`.

use crate::error::ClassifierError;
use crate::feature_aligner::EncodedRecord;
use crate::models::classifier::{check_row, Classifier};
use serde::{Deserialize, Serialize};

fn default_model_name() -> String {
    "logistic_regression".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

/// Logistic regression over the aligned feature row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// One coefficient per schema column, in schema order
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Positive-class probability above which the label is 1
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let model: LogisticModel = serde_json::from_str(json).map_err(|e| e.to_string())?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.weights.is_empty() {
            return Err("model has no weights".to_string());
        }
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(format!("weight {i} is not finite"));
        }
        if !self.bias.is_finite() {
            return Err("bias is not finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold {} is outside [0, 1]", self.threshold));
        }
        Ok(())
    }

    fn positive_probability(&self, row: &EncodedRecord) -> Result<f64, ClassifierError> {
        check_row(&self.model_name, Some(self.weights.len()), row)?;

        let z = self
            .weights
            .iter()
            .zip(row.values())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Ok(sigmoid(z))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.weights.len())
    }

    fn predict(&self, row: &EncodedRecord) -> Result<i64, ClassifierError> {
        let p = self.positive_probability(row)?;
        Ok(if p > self.threshold { 1 } else { 0 })
    }

    fn predict_proba(&self, row: &EncodedRecord) -> Result<Vec<f64>, ClassifierError> {
        let p = self.positive_probability(row)?;
        Ok(vec![1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_aligner::{FeatureAligner, FeatureSchema};
    use crate::types::ClientRecord;
    use std::sync::Arc;

    fn aligner() -> FeatureAligner {
        let names = vec!["duration".to_string(), "poutcome_success".to_string()];
        FeatureAligner::new(Arc::new(FeatureSchema::new(names).unwrap()))
    }

    #[test]
    fn test_parse_defaults() {
        let model = LogisticModel::from_json(r#"{"weights": [0.01, 2.0], "bias": -3.0}"#).unwrap();
        assert_eq!(model.name(), "logistic_regression");
        assert_eq!(model.threshold, 0.5);
        assert_eq!(model.input_width(), Some(2));
    }

    #[test]
    fn test_parse_rejects_bad_models() {
        assert!(LogisticModel::from_json(r#"{"weights": [], "bias": 0.0}"#).is_err());
        assert!(LogisticModel::from_json(r#"{"weights": [1.0], "bias": 0.0, "threshold": 1.5}"#).is_err());
        assert!(LogisticModel::from_json(r#"{"bias": 0.0}"#).is_err());
    }

    #[test]
    fn test_predict() {
        let model = LogisticModel::from_json(r#"{"weights": [0.01, 2.0], "bias": -3.0}"#).unwrap();

        let (row, _) = aligner().align(&ClientRecord {
            duration: 100,
            ..ClientRecord::default()
        });
        // z = 1.0 - 3.0 = -2.0
        let proba = model.predict_proba(&row).unwrap();
        assert!((proba[1] - sigmoid(-2.0)).abs() < 1e-12);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&row).unwrap(), 0);

        let (row, _) = aligner().align(&ClientRecord {
            duration: 300,
            poutcome: "success".to_string(),
            ..ClientRecord::default()
        });
        // z = 3.0 + 2.0 - 3.0 = 2.0
        assert_eq!(model.predict(&row).unwrap(), 1);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LogisticModel::from_json(r#"{"weights": [1.0, 1.0, 1.0], "bias": 0.0}"#).unwrap();
        let (row, _) = aligner().align(&ClientRecord::default());

        let err = model.predict(&row).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ShapeMismatch {
                model: "logistic_regression".to_string(),
                expected: 3,
                actual: 2
            }
        );
    }
}
