//! Artifact loader for the classifier and its feature schema

use crate::config::ArtifactsConfig;
use crate::error::{ArtifactError, ArtifactKind};
use crate::feature_aligner::FeatureSchema;
use crate::models::classifier::Classifier;
use crate::models::logistic::LogisticModel;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a prediction needs, loaded once per process
#[derive(Clone)]
pub struct Artifacts {
    pub classifier: Arc<dyn Classifier>,
    pub schema: Arc<FeatureSchema>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("classifier", &self.classifier.name())
            .field("features", &self.schema.len())
            .finish()
    }
}

/// Loader for model artifacts
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the classifier, then the feature schema. Both are required.
    pub fn load(&self, config: &ArtifactsConfig) -> Result<Artifacts, ArtifactError> {
        let classifier = self.load_classifier(&config.model_path)?;
        let schema = Arc::new(self.load_feature_schema(&config.feature_names_path)?);

        let unreachable = schema.unreachable_columns();
        if !unreachable.is_empty() {
            warn!(
                columns = ?unreachable,
                "Feature schema has columns no form field produces; they will always be 0"
            );
        }

        if let Some(width) = classifier.input_width() {
            if width != schema.len() {
                warn!(
                    model = %classifier.name(),
                    model_width = width,
                    schema_width = schema.len(),
                    "Model input width differs from the feature schema; predictions will fail"
                );
            }
        }

        Ok(Artifacts { classifier, schema })
    }

    /// Load the ordered feature-name list (a JSON array of strings)
    pub fn load_feature_schema<P: AsRef<Path>>(&self, path: P) -> Result<FeatureSchema, ArtifactError> {
        let path = path.as_ref();
        let kind = ArtifactKind::FeatureNames;

        let raw = read_artifact(path, kind)?;
        let names: Vec<String> = serde_json::from_str(&raw).map_err(|e| ArtifactError::Malformed {
            kind,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let schema = FeatureSchema::new(names).map_err(|e| ArtifactError::Malformed {
            kind,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), features = schema.len(), "Feature schema loaded");
        Ok(schema)
    }

    /// Load a classifier, choosing the backend by file extension
    pub fn load_classifier<P: AsRef<Path>>(&self, path: P) -> Result<Arc<dyn Classifier>, ArtifactError> {
        let path = path.as_ref();
        let kind = ArtifactKind::Model;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let classifier: Arc<dyn Classifier> = match extension.as_deref() {
            Some("json") => {
                let raw = read_artifact(path, kind)?;
                let model = LogisticModel::from_json(&raw).map_err(|reason| ArtifactError::Malformed {
                    kind,
                    path: path.to_path_buf(),
                    reason,
                })?;
                Arc::new(model)
            }
            Some("onnx") => self.load_onnx(path)?,
            _ => {
                return Err(ArtifactError::Unsupported {
                    kind,
                    path: path.to_path_buf(),
                    reason: "expected a .json or .onnx model".to_string(),
                })
            }
        };

        info!(
            model = %classifier.name(),
            path = %path.display(),
            "Model loaded successfully"
        );
        Ok(classifier)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
        use crate::models::onnx::OnnxClassifier;

        if !path.is_file() {
            return Err(ArtifactError::Missing {
                kind: ArtifactKind::Model,
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx_model");

        let model = OnnxClassifier::load(path, name, self.onnx_threads).map_err(|e| {
            ArtifactError::Malformed {
                kind: ArtifactKind::Model,
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            }
        })?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
        if !path.is_file() {
            return Err(ArtifactError::Missing {
                kind: ArtifactKind::Model,
                path: path.to_path_buf(),
            });
        }

        warn!(
            threads = self.onnx_threads,
            "ONNX model requested but the onnx feature is disabled"
        );
        Err(ArtifactError::Unsupported {
            kind: ArtifactKind::Model,
            path: path.to_path_buf(),
            reason: "this build has no ONNX support (enable the `onnx` feature)".to_string(),
        })
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_artifact(path: &Path, kind: ArtifactKind) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Unreadable {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
