//! Prediction engine: alignment followed by classifier inference

use crate::error::PredictionError;
use crate::feature_aligner::{EncodedRecord, FeatureAligner, FeatureSchema};
use crate::models::classifier::Classifier;
use crate::models::loader::Artifacts;
use crate::types::client::ClientRecord;
use crate::types::prediction::Prediction;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Scores client records against the loaded classifier
pub struct PredictionEngine {
    aligner: FeatureAligner,
    classifier: Arc<dyn Classifier>,
}

impl PredictionEngine {
    pub fn new(artifacts: Artifacts) -> Self {
        Self::from_parts(artifacts.classifier, artifacts.schema)
    }

    pub fn from_parts(classifier: Arc<dyn Classifier>, schema: Arc<FeatureSchema>) -> Self {
        info!(
            model = %classifier.name(),
            features = schema.len(),
            "Prediction engine initialized"
        );
        Self {
            aligner: FeatureAligner::new(schema),
            classifier,
        }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn feature_count(&self) -> usize {
        self.aligner.feature_count()
    }

    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    /// Align a record and run the classifier on it
    pub fn score(&self, record: &ClientRecord) -> Result<Prediction, PredictionError> {
        let (row, report) = self.aligner.align(record);
        let prediction = self.predict(&row)?;
        Ok(prediction.with_unseen_categories(report.unseen_categories))
    }

    /// Run `predict` and `predict_proba` on an aligned row
    pub fn predict(&self, row: &EncodedRecord) -> Result<Prediction, PredictionError> {
        let result = self
            .classifier
            .predict(row)
            .and_then(|label| Ok((label, self.classifier.predict_proba(row)?)));

        match result {
            Ok((label, probabilities)) => {
                let prediction = Prediction::new(label, probabilities);
                debug!(
                    prediction_id = %prediction.prediction_id,
                    model = %self.classifier.name(),
                    label,
                    outcome = ?prediction.outcome,
                    probabilities = ?prediction.probabilities,
                    "Prediction complete"
                );
                Ok(prediction)
            }
            Err(e) => {
                error!(model = %self.classifier.name(), error = %e, "Prediction failed");
                Err(PredictionError::from(e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::feature_aligner::all_column_names;
    use crate::types::prediction::Outcome;

    /// Classifier returning a fixed answer, or a fixed failure
    pub(crate) struct FixedClassifier {
        pub label: i64,
        pub probabilities: Vec<f64>,
        pub failure: Option<ClassifierError>,
    }

    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _row: &EncodedRecord) -> Result<i64, ClassifierError> {
            match &self.failure {
                Some(e) => Err(e.clone()),
                None => Ok(self.label),
            }
        }

        fn predict_proba(&self, _row: &EncodedRecord) -> Result<Vec<f64>, ClassifierError> {
            Ok(self.probabilities.clone())
        }
    }

    pub(crate) fn engine(classifier: FixedClassifier) -> PredictionEngine {
        let schema = Arc::new(FeatureSchema::new(all_column_names()).unwrap());
        PredictionEngine::from_parts(Arc::new(classifier), schema)
    }

    #[test]
    fn test_unlikely_scenario() {
        let engine = engine(FixedClassifier {
            label: 0,
            probabilities: vec![0.7, 0.3],
            failure: None,
        });
        let record = ClientRecord {
            job: "student".to_string(),
            marital: "single".to_string(),
            education: "tertiary".to_string(),
            contact: "cellular".to_string(),
            month: "may".to_string(),
            duration: 120,
            ..ClientRecord::default()
        };

        let prediction = engine.score(&record).unwrap();
        assert_eq!(prediction.outcome, Outcome::Unlikely);
        assert_eq!(prediction.probabilities_display(), "[0.7, 0.3]");
        assert!(prediction.unseen_categories.is_empty());
    }

    #[test]
    fn test_likely_scenario() {
        let engine = engine(FixedClassifier {
            label: 1,
            probabilities: vec![0.1, 0.9],
            failure: None,
        });

        let prediction = engine.score(&ClientRecord::default()).unwrap();
        assert_eq!(prediction.outcome, Outcome::Likely);
        assert_eq!(
            prediction.message,
            "The client is likely to subscribe to the term deposit."
        );
    }

    #[test]
    fn test_classifier_failure_becomes_prediction_error() {
        let engine = engine(FixedClassifier {
            label: 0,
            probabilities: vec![],
            failure: Some(ClassifierError::Backend("could not convert string to float".to_string())),
        });

        let err = engine.score(&ClientRecord::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "An error occurred during prediction: could not convert string to float"
        );

        // The engine stays usable after a failure.
        assert!(engine.score(&ClientRecord::default()).is_err());
        assert_eq!(engine.feature_count(), 51);
    }
}
