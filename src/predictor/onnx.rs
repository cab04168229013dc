//! ONNX Runtime adapter for a binary leaf-health model.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::RgbImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::info;

use super::{preprocess, LearnedPredictor};
use crate::error::PredictorError;

pub struct OnnxPredictor {
    session: Mutex<Session>,
    input_size: u32,
    name: String,
}

impl OnnxPredictor {
    /// Load a serialized model accepting a `(1, size, size, 3)` float tensor.
    pub fn load(path: &Path, input_size: u32, intra_threads: usize) -> Result<Self, PredictorError> {
        if !path.exists() {
            return Err(PredictorError::MissingArtifact(path.to_path_buf()));
        }

        let _ = ort::init().with_name("leafcheck").commit();

        let session = Session::builder()
            .map_err(|e| PredictorError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PredictorError::Load(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(intra_threads)
            .map_err(|e| PredictorError::Load(format!("Failed to set intra threads: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| PredictorError::Load(format!("Failed to load ONNX model: {}", e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| PathBuf::from(path).display().to_string());
        info!("Loaded ONNX model {} ({}x{} input)", name, input_size, input_size);

        Ok(Self {
            session: Mutex::new(session),
            input_size,
            name,
        })
    }
}

impl LearnedPredictor for OnnxPredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, image: &RgbImage) -> Result<f32, PredictorError> {
        let tensor = preprocess(image, self.input_size)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictorError::Invocation("model session lock poisoned".to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| PredictorError::Invocation("Model declares no inputs".to_string()))?;

        let input_tensor = Value::from_array(tensor)
            .map_err(|e| PredictorError::Invocation(format!("Failed to create tensor value: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_tensor])
            .map_err(|e| PredictorError::Invocation(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| PredictorError::Invocation("Model produced no outputs".to_string()))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictorError::Invocation(format!("Failed to extract output tensor: {}", e)))?;

        data.first()
            .copied()
            .ok_or_else(|| PredictorError::Invocation("Model output is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_reported() {
        let result = OnnxPredictor::load(Path::new("/no/such/model.onnx"), 224, 1);
        assert!(matches!(result, Err(PredictorError::MissingArtifact(_))));
    }
}
