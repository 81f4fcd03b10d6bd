//! Binary classifier abstraction

use crate::error::ClassifierError;
use crate::feature_aligner::EncodedRecord;

/// A trained classifier loaded from an external artifact.
///
/// Implementations are immutable after loading and shared across requests.
pub trait Classifier: Send + Sync {
    /// Model name, for logs
    fn name(&self) -> &str;

    /// Number of input columns the model expects, when the artifact declares it
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Predicted class label for one row
    fn predict(&self, row: &EncodedRecord) -> Result<i64, ClassifierError>;

    /// Class probabilities for one row, indexed by class label
    fn predict_proba(&self, row: &EncodedRecord) -> Result<Vec<f64>, ClassifierError>;
}

/// Reject rows the model cannot score
pub(crate) fn check_row(
    model: &str,
    expected: Option<usize>,
    row: &EncodedRecord,
) -> Result<(), ClassifierError> {
    if let Some(expected) = expected {
        if row.len() != expected {
            return Err(ClassifierError::ShapeMismatch {
                model: model.to_string(),
                expected,
                actual: row.len(),
            });
        }
    }

    if let Some((column, _)) = row.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ClassifierError::NonFinite {
            column: column.to_string(),
        });
    }

    Ok(())
}

/// Label of the most probable class. Ties go to the lower label, so an even
/// split between the two classes is labelled "unlikely".
pub(crate) fn most_probable_label(probabilities: &[f64]) -> Option<i64> {
    let mut best: Option<(usize, f64)> = None;
    for (label, &p) in probabilities.iter().enumerate() {
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((label, p)),
        }
    }
    best.map(|(label, _)| label as i64)
}
