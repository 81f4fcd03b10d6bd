//! Error types shared across the predictor

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which artifact a loading error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    FeatureNames,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => write!(f, "Model"),
            ArtifactKind::FeatureNames => write!(f, "Feature names"),
        }
    }
}

/// Failure to load the model or the feature schema. Fatal for the session.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{kind} file '{}' not found. Please ensure it is in the configured location.", .path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },

    #[error("{kind} file '{}' could not be read: {source}", .path.display())]
    Unreadable {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} file '{}' is malformed: {reason}", .path.display())]
    Malformed {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error("{kind} file '{}' has an unsupported format: {reason}", .path.display())]
    Unsupported {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },
}

impl ArtifactError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactError::Missing { kind, .. }
            | ArtifactError::Unreadable { kind, .. }
            | ArtifactError::Malformed { kind, .. }
            | ArtifactError::Unsupported { kind, .. } => *kind,
        }
    }
}

/// Invalid ordered feature-name list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("feature name list is empty")]
    Empty,
    #[error("feature name '{0}' appears more than once")]
    Duplicate(String),
}

/// Rejected form or API submission. The form stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field}: '{value}' is not a whole number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field}: '{value}' is not one of the available options")]
    UnknownChoice { field: &'static str, value: String },
}

/// Error raised by a classifier backend while scoring one row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("X has {actual} features, but {model} is expecting {expected} features as input")]
    ShapeMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("input contains a non-finite value in column '{column}'")]
    NonFinite { column: String },
    #[error("{0}")]
    Backend(String),
}

/// Prediction failure surfaced to the user
#[derive(Debug, Clone, PartialEq, Error)]
#[error("An error occurred during prediction: {0}")]
pub struct PredictionError(#[from] pub ClassifierError);
