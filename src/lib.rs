//! Term Deposit Predictor Library
//!
//! Collects a bank client's attributes through a single-page form, aligns them
//! to the feature schema of an externally trained classifier, and reports
//! whether the client is likely to subscribe to a term deposit.

pub mod config;
pub mod error;
pub mod feature_aligner;
pub mod form;
pub mod metrics;
pub mod models;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::{ArtifactError, ClassifierError, FormError, PredictionError};
pub use feature_aligner::{EncodedRecord, FeatureAligner, FeatureSchema};
pub use models::{ArtifactLoader, Classifier, PredictionEngine};
pub use types::{client::ClientRecord, prediction::Prediction};
