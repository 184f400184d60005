//! ONNX Runtime backend for the trained classifier.

use crate::core::config::EngineConfig;
use crate::core::constants::NUM_CLASSES;
use crate::core::errors::{DiagResult, DiagnosisError, SimpleError};
use crate::core::tensor::{to_batch, ImageTensor};
use crate::domain::ProbabilityVector;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Pooled ONNX Runtime sessions around the trained model file.
///
/// Sessions are selected round-robin so concurrent callers spread across the
/// pool instead of serializing on a single session lock.
pub struct OnnxBackend {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxBackend")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OnnxBackend {
    /// Loads the model file into a session pool.
    ///
    /// Input and output tensor names are discovered from the session
    /// metadata of the first session rather than hardcoded, so exports from
    /// different converters keep working.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError::ModelUnavailable`] when a session cannot be
    /// created or the model declares no input or output tensors.
    pub fn load(config: &EngineConfig, path: &Path) -> DiagResult<Self> {
        let pool_size = config.session_pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        let mut tensor_names: Option<(String, String)> = None;

        for _ in 0..pool_size {
            let session = Session::builder()
                .and_then(|builder| builder.with_log_level(LogLevel::Error))
                .and_then(|builder| builder.commit_from_file(path))
                .map_err(|source| {
                    DiagnosisError::model_unavailable(
                        format!("failed to create ONNX session: {source}"),
                        path.display().to_string(),
                    )
                })?;

            if tensor_names.is_none() {
                let input = session.inputs.first().map(|input| input.name.clone());
                let output = session.outputs.first().map(|output| output.name.clone());
                match (input, output) {
                    (Some(input), Some(output)) => tensor_names = Some((input, output)),
                    (None, _) => {
                        return Err(DiagnosisError::model_unavailable(
                            "model declares no input tensors",
                            path.display().to_string(),
                        ));
                    }
                    (_, None) => {
                        return Err(DiagnosisError::model_unavailable(
                            "model declares no output tensors",
                            path.display().to_string(),
                        ));
                    }
                }
            }
            sessions.push(Mutex::new(session));
        }

        let (input_name, output_name) = tensor_names.ok_or_else(|| {
            DiagnosisError::model_unavailable(
                "session pool is empty",
                path.display().to_string(),
            )
        })?;

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
        })
    }

    /// Runs the model on a single input tensor.
    ///
    /// The tensor is promoted to a batch of one, the forward pass must
    /// produce a `[1, 4]` f32 output, and the raw scores pass through a
    /// stable softmax before validation against the simplex invariant.
    ///
    /// # Errors
    ///
    /// Returns an `Inference` error when the forward pass fails or the
    /// output has an unexpected shape.
    pub fn predict(&self, tensor: &ImageTensor) -> DiagResult<ProbabilityVector> {
        let batch = to_batch(tensor);
        let input_tensor = TensorRef::from_array_view(batch.view())
            .map_err(|source| DiagnosisError::inference("failed to convert input tensor", source))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            DiagnosisError::inference(
                format!("failed to acquire session lock {}/{}", idx, self.sessions.len()),
                SimpleError::new("session lock acquisition failed"),
            )
        })?;

        let outputs = session_guard
            .run(inputs)
            .map_err(|source| DiagnosisError::inference("forward pass failed", source))?;
        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|source| {
                DiagnosisError::inference(
                    format!("failed to extract output '{}' as f32", self.output_name),
                    source,
                )
            })?;

        if shape.len() != 2 || shape[0] != 1 || shape[1] != NUM_CLASSES as i64 {
            return Err(DiagnosisError::inference(
                format!("expected output shape [1, {NUM_CLASSES}], got {shape:?}"),
                SimpleError::new("unexpected output shape"),
            ));
        }

        ProbabilityVector::new(super::softmax(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_model_unavailable() {
        let error = OnnxBackend::load(
            &EngineConfig::default(),
            Path::new("/nonexistent/skin_disease_model.onnx"),
        )
        .unwrap_err();
        match error {
            DiagnosisError::ModelUnavailable { model_path, .. } => {
                assert!(model_path.contains("skin_disease_model.onnx"));
            }
            other => panic!("Expected ModelUnavailable error, got {other:?}"),
        }
    }
}
