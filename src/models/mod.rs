//! Classifier loading and inference components

pub mod classifier;
pub mod loader;
pub mod logistic;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;

pub use classifier::Classifier;
pub use loader::{ArtifactLoader, Artifacts};
pub use logistic::LogisticModel;
pub use predictor::PredictionEngine;
