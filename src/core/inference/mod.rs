//! Inference backends and the engine facade over them.
//!
//! The engine wraps one of two backends chosen once at construction: the
//! ONNX Runtime session pool around the trained model, or the deterministic
//! placeholder used when no artifact is available. Callers only see
//! `InferenceEngine` and never re-select a backend per request.

mod onnx;
mod placeholder;

use crate::core::config::EngineConfig;
use crate::core::constants::{
    MODEL_INPUT_SHAPE_LABEL, MODEL_PREPROCESSING_LABEL, MODEL_TYPE_LABEL, NUM_CLASSES,
};
use crate::core::errors::{DiagResult, DiagnosisError};
use crate::core::tensor::{validate_model_input, ImageTensor};
use crate::domain::{DiseaseClass, ProbabilityVector};
use onnx::OnnxBackend;
use placeholder::PlaceholderBackend;
use serde::Serialize;
use tracing::{info, warn};

/// Static description of the model behind the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Architecture label of the trained model.
    pub model_type: &'static str,
    /// Expected input shape, as a display string.
    pub input_shape: &'static str,
    /// Preprocessing the model was trained against.
    pub preprocessing: &'static str,
    /// True when predictions come from the placeholder backend.
    pub using_placeholder: bool,
}

/// One classification outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Class with the highest probability; earlier canonical class wins ties.
    pub class: DiseaseClass,
    /// Probability of the predicted class.
    pub confidence: f32,
    /// Full distribution over all classes.
    pub probabilities: ProbabilityVector,
    /// True when the distribution came from the placeholder backend.
    pub using_placeholder: bool,
}

#[derive(Debug)]
enum ModelBackend {
    Onnx(OnnxBackend),
    Placeholder(PlaceholderBackend),
}

/// Backend-agnostic classifier facade.
#[derive(Debug)]
pub struct InferenceEngine {
    backend: ModelBackend,
}

impl InferenceEngine {
    /// Selects and constructs a backend from the engine configuration.
    ///
    /// A configured and loadable model file yields the ONNX backend. A
    /// missing or unloadable artifact falls back to the placeholder when
    /// [`EngineConfig::allow_placeholder`] is set, and is fatal otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for an invalid configuration and
    /// [`DiagnosisError::ModelUnavailable`] when no usable backend can be
    /// constructed.
    pub fn from_config(config: &EngineConfig) -> DiagResult<Self> {
        config.validate()?;

        let Some(path) = &config.model_path else {
            if config.allow_placeholder {
                warn!("no model path configured, using placeholder backend");
                return Ok(Self::with_placeholder());
            }
            return Err(DiagnosisError::model_unavailable(
                "no model path configured and placeholder fallback is disabled",
                "<unset>",
            ));
        };

        if !path.exists() {
            if config.allow_placeholder {
                warn!(
                    model_path = %path.display(),
                    "model file not found, using placeholder backend"
                );
                return Ok(Self::with_placeholder());
            }
            return Err(DiagnosisError::model_unavailable(
                "model file not found and placeholder fallback is disabled",
                path.display().to_string(),
            ));
        }

        match OnnxBackend::load(config, path) {
            Ok(backend) => {
                info!(model_path = %path.display(), "loaded ONNX model");
                Ok(Self {
                    backend: ModelBackend::Onnx(backend),
                })
            }
            Err(error) if config.allow_placeholder => {
                warn!(
                    model_path = %path.display(),
                    error = %error,
                    "model failed to load, using placeholder backend"
                );
                Ok(Self::with_placeholder())
            }
            Err(error) => Err(error),
        }
    }

    /// Creates an engine backed by the deterministic placeholder.
    pub fn with_placeholder() -> Self {
        Self {
            backend: ModelBackend::Placeholder(PlaceholderBackend),
        }
    }

    /// True when predictions come from the placeholder backend.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.backend, ModelBackend::Placeholder(_))
    }

    /// Describes the model behind this engine.
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_type: MODEL_TYPE_LABEL,
            input_shape: MODEL_INPUT_SHAPE_LABEL,
            preprocessing: MODEL_PREPROCESSING_LABEL,
            using_placeholder: self.is_placeholder(),
        }
    }

    /// Classifies one preprocessed input tensor.
    ///
    /// # Errors
    ///
    /// Returns an internal `Processing` error when the tensor does not match
    /// the model input shape, and an `Inference` error when the backend
    /// fails.
    pub fn predict(&self, tensor: &ImageTensor) -> DiagResult<Prediction> {
        validate_model_input(tensor)?;
        let probabilities = match &self.backend {
            ModelBackend::Onnx(backend) => backend.predict(tensor)?,
            ModelBackend::Placeholder(backend) => backend.predict(tensor)?,
        };
        let (class, confidence) = probabilities.top();
        Ok(Prediction {
            class,
            confidence,
            probabilities,
            using_placeholder: self.is_placeholder(),
        })
    }
}

/// Numerically stable softmax over raw class scores.
///
/// Scores are shifted by their maximum before exponentiation and the whole
/// computation runs in `f64`, so large logits cannot overflow and the result
/// lands on the probability simplex.
pub(crate) fn softmax(scores: &[f32]) -> [f32; NUM_CLASSES] {
    let mut max = f64::NEG_INFINITY;
    for &score in scores {
        max = max.max(f64::from(score));
    }

    let mut exps = [0.0f64; NUM_CLASSES];
    for (exp, &score) in exps.iter_mut().zip(scores) {
        *exp = (f64::from(score) - max).exp();
    }
    let sum: f64 = exps.iter().sum();

    let mut probabilities = [0.0f32; NUM_CLASSES];
    for (probability, exp) in probabilities.iter_mut().zip(&exps) {
        *probability = (exp / sum) as f32;
    }
    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn model_input() -> ImageTensor {
        Array3::from_shape_fn((224, 224, 3), |(h, w, c)| {
            ((h + w + c) % 256) as f32 / 255.0
        })
    }

    #[test]
    fn default_config_selects_the_placeholder() {
        let engine = InferenceEngine::from_config(&EngineConfig::default()).unwrap();
        assert!(engine.is_placeholder());
    }

    #[test]
    fn strict_config_without_an_artifact_is_fatal() {
        let config = EngineConfig {
            allow_placeholder: false,
            ..EngineConfig::default()
        };
        let error = InferenceEngine::from_config(&config).unwrap_err();
        assert!(matches!(error, DiagnosisError::ModelUnavailable { .. }));

        let config = EngineConfig {
            model_path: Some("/nonexistent/model.onnx".into()),
            allow_placeholder: false,
            ..EngineConfig::default()
        };
        let error = InferenceEngine::from_config(&config).unwrap_err();
        assert!(matches!(error, DiagnosisError::ModelUnavailable { .. }));
    }

    #[test]
    fn missing_artifact_with_fallback_enabled_uses_the_placeholder() {
        let config = EngineConfig {
            model_path: Some("/nonexistent/model.onnx".into()),
            ..EngineConfig::default()
        };
        let engine = InferenceEngine::from_config(&config).unwrap();
        assert!(engine.is_placeholder());
        assert!(engine.model_info().using_placeholder);
    }

    #[test]
    fn model_info_carries_the_architecture_labels() {
        let info = InferenceEngine::with_placeholder().model_info();
        assert_eq!(info.model_type, "EfficientNetB0");
        assert_eq!(info.input_shape, "224x224x3");
        assert_eq!(info.preprocessing, "Dull-Razor + Normalization");
    }

    #[test]
    fn prediction_reports_the_top_class() {
        let engine = InferenceEngine::with_placeholder();
        let prediction = engine.predict(&model_input()).unwrap();
        assert!(prediction.probabilities.validate().is_ok());
        let (top_class, top_confidence) = prediction.probabilities.top();
        assert_eq!(prediction.class, top_class);
        assert_eq!(prediction.confidence, top_confidence);
        assert!(prediction.using_placeholder);
    }

    #[test]
    fn predictions_are_deterministic() {
        let engine = InferenceEngine::with_placeholder();
        let first = engine.predict(&model_input()).unwrap();
        let second = engine.predict(&model_input()).unwrap();
        assert_eq!(first.probabilities.values(), second.probabilities.values());
        assert_eq!(first.class, second.class);
    }

    #[test]
    fn wrong_input_shape_is_rejected() {
        let engine = InferenceEngine::with_placeholder();
        let undersized = Array3::<f32>::zeros((100, 100, 3));
        assert!(engine.predict(&undersized).is_err());
    }

    #[test]
    fn softmax_lands_on_the_simplex() {
        let probabilities = softmax(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f32 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let small = softmax(&[1.0, 2.0, 3.0, 4.0]);
        let shifted = softmax(&[1001.0, 1002.0, 1003.0, 1004.0]);
        for (a, b) in small.iter().zip(&shifted) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn softmax_survives_large_scores() {
        let probabilities = softmax(&[1000.0, 0.0, -1000.0, 500.0]);
        assert!(probabilities.iter().all(|p| p.is_finite()));
        assert!(probabilities[0] > probabilities[3]);
    }

    #[test]
    fn uniform_scores_softmax_to_uniform() {
        let probabilities = softmax(&[0.5, 0.5, 0.5, 0.5]);
        for p in probabilities {
            assert!((p - 0.25).abs() < 1e-6);
        }
    }
}
