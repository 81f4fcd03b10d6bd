//! ONNX Runtime classifier backend

use crate::error::ClassifierError;
use crate::feature_aligner::EncodedRecord;
use crate::models::classifier::{check_row, most_probable_label, Classifier};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier exported to ONNX (skl2onnx, onnxmltools)
pub struct OnnxClassifier {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Load an ONNX graph with the given number of intra-op threads
    pub fn load<P: AsRef<Path>>(path: P, name: &str, threads: usize) -> Result<Self> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, row: &EncodedRecord) -> Result<Vec<f64>> {
        // Shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, row.to_f32())).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;
        let probabilities = self.extract_probabilities(&outputs)?;

        debug!(model = %self.name, ?probabilities, "ONNX inference complete");
        Ok(probabilities)
    }

    /// Handles tensor outputs (XGBoost, RandomForest, LogisticRegression) and
    /// seq(map) outputs (CatBoost, LightGBM, zipmap-enabled sklearn exports)
    fn extract_probabilities(&self, outputs: &SessionOutputs) -> Result<Vec<f64>> {
        if let Some(output) = outputs.get(&self.output_name) {
            if let Some(probabilities) = self.extract_from_value(&output)? {
                return Ok(probabilities);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(probabilities) = self.extract_from_value(&output)? {
                debug!(model = %self.name, output = %name, "Extracted probabilities (fallback)");
                return Ok(probabilities);
            }
        }

        anyhow::bail!("model {} produced no probability output", self.name)
    }

    fn extract_from_value(&self, output: &DynValue) -> Result<Option<Vec<f64>>> {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(Some(probabilities_from_tensor(&dims, data)));
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            return self.extract_from_sequence_map(output).map(Some);
        }

        Ok(None)
    }

    /// seq(map(int64, float)), one map per row
    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<Vec<f64>> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        let map_value = maps
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;

        let mut pairs = map_value.try_extract_key_values::<i64, f32>()?;
        if pairs.is_empty() {
            anyhow::bail!("No probability found in map");
        }
        pairs.sort_by_key(|(class_id, _)| *class_id);

        Ok(pairs.into_iter().map(|(_, p)| p as f64).collect())
    }
}

/// Probability vector from a `[1, n]` or `[n]` tensor
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Vec<f64> {
    let width = dims.last().copied().unwrap_or(0).max(0) as usize;
    let width = width.min(data.len());

    match width {
        0 => Vec::new(),
        // Single positive-class probability
        1 => {
            let p = data[0] as f64;
            vec![1.0 - p, p]
        }
        n => data[..n].iter().map(|&p| p as f64).collect(),
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, row: &EncodedRecord) -> Result<i64, ClassifierError> {
        let probabilities = self.predict_proba(row)?;
        most_probable_label(&probabilities)
            .ok_or_else(|| ClassifierError::Backend(format!("model {} returned no classes", self.name)))
    }

    fn predict_proba(&self, row: &EncodedRecord) -> Result<Vec<f64>, ClassifierError> {
        check_row(&self.name, None, row)?;
        self.run(row)
            .map_err(|e| ClassifierError::Backend(format!("{e:#}")))
    }
}
