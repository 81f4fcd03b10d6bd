//! Prediction result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription outcome derived from the predicted class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Likely,
    Unlikely,
}

impl Outcome {
    /// Class 1 means the client subscribes; any other label does not
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Outcome::Likely
        } else {
            Outcome::Unlikely
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Likely => "The client is likely to subscribe to the term deposit.",
            Outcome::Unlikely => "The client is not likely to subscribe to the term deposit.",
        }
    }
}

/// A categorical value whose indicator column is absent from the trained
/// feature set. It was encoded as all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnseenCategory {
    pub attribute: String,
    pub value: String,
}

impl UnseenCategory {
    pub fn note(&self) -> String {
        format!(
            "'{}' for {} has no column in the trained feature set and was encoded as all zeros.",
            self.value, self.attribute
        )
    }
}

/// Prediction for one submitted client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique prediction identifier, for correlating logs
    pub prediction_id: String,

    /// Class label returned by the classifier
    pub label: i64,

    pub outcome: Outcome,

    /// User-facing message for the outcome
    pub message: String,

    /// Class probabilities, as returned by the classifier
    pub probabilities: Vec<f64>,

    /// Categorical values that fell outside the trained vocabulary
    pub unseen_categories: Vec<UnseenCategory>,

    pub predicted_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(label: i64, probabilities: Vec<f64>) -> Self {
        let outcome = Outcome::from_label(label);
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            label,
            outcome,
            message: outcome.message().to_string(),
            probabilities,
            unseen_categories: Vec::new(),
            predicted_at: Utc::now(),
        }
    }

    pub fn with_unseen_categories(mut self, unseen: Vec<UnseenCategory>) -> Self {
        self.unseen_categories = unseen;
        self
    }

    /// Probability of the positive class, when the classifier reported one
    pub fn positive_probability(&self) -> Option<f64> {
        self.probabilities.get(1).copied()
    }

    /// Probabilities in shortest round-trip form, e.g. `[0.7, 0.3]`
    pub fn probabilities_display(&self) -> String {
        let values: Vec<String> = self.probabilities.iter().map(|p| format!("{p:?}")).collect();
        format!("[{}]", values.join(", "))
    }
}
