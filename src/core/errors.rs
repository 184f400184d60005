//! Error types for the diagnosis pipeline.
//!
//! This module defines the errors that can occur while turning an image
//! payload into a diagnosis: decode and validation failures the caller can
//! correct, the fatal absence of an inference backend, internal processing
//! failures, and the defensive unknown-class error raised when a predicted
//! label escapes the canonical set. Helper constructors keep error creation
//! uniform across the pipeline.

use thiserror::Error;

/// Enum representing different stages of processing in the diagnosis pipeline.
///
/// This enum is used to identify which stage of the pipeline an internal
/// error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Error occurred while decoding the image payload.
    Decode,
    /// Error occurred during hair detection or inpainting.
    HairRemoval,
    /// Error occurred during resizing.
    Resize,
    /// Error occurred during intensity normalization.
    Normalization,
    /// Error occurred during tensor construction.
    TensorLayout,
    /// Error occurred while assembling the result.
    Assembly,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Decode => write!(f, "decode"),
            PipelineStage::HairRemoval => write!(f, "hair removal"),
            PipelineStage::Resize => write!(f, "resize"),
            PipelineStage::Normalization => write!(f, "normalization"),
            PipelineStage::TensorLayout => write!(f, "tensor layout"),
            PipelineStage::Assembly => write!(f, "result assembly"),
        }
    }
}

/// A minimal error used as a source when no underlying error exists.
#[derive(Debug, Clone)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

/// Enum representing the errors that can occur in the diagnosis pipeline.
///
/// `Decode` and `Validation` are caller errors: the request was malformed
/// and a corrected request can succeed. `ModelUnavailable` is fatal at
/// startup. `UnknownClass` signals an internal inconsistency between the
/// classifier labels and the clinical knowledge base and is never papered
/// over with a default record.
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// The payload could not be decoded as a supported image format.
    #[error("image decode failed: {message}")]
    Decode {
        /// A message describing why decoding failed.
        message: String,
        /// The underlying decoder error, if any.
        #[source]
        source: Option<image::ImageError>,
    },

    /// The input was decodable but violates an input constraint.
    #[error("invalid input: {message}")]
    Validation {
        /// A message describing the violated constraint.
        message: String,
    },

    /// No usable inference backend could be constructed at startup.
    #[error("no usable inference backend: {reason} (model path: {model_path})")]
    ModelUnavailable {
        /// Why the backend could not be constructed.
        reason: String,
        /// The configured model path, or a placeholder when none was set.
        model_path: String,
    },

    /// A predicted class name has no entry in the clinical knowledge base.
    #[error("unknown disease class '{class_name}'")]
    UnknownClass {
        /// The class name that missed the lookup.
        class_name: String,
    },

    /// The request was cancelled before inference started.
    #[error("diagnosis aborted by caller")]
    Aborted,

    /// Error occurred during internal processing.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of the pipeline where the error occurred.
        stage: PipelineStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference failed: {context}")]
    Inference {
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),
}

/// Convenient result alias for pipeline operations.
pub type DiagResult<T> = Result<T, DiagnosisError>;

/// Implementation of DiagnosisError with utility functions for creating errors.
impl DiagnosisError {
    /// Creates a DiagnosisError for a failed image decode.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing why decoding failed.
    /// * `source` - The underlying decoder error.
    pub fn decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a DiagnosisError for an undecodable payload without a source.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing why decoding failed.
    pub fn decode_message(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a DiagnosisError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the violated constraint.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a DiagnosisError for a missing or unloadable model backend.
    ///
    /// # Arguments
    ///
    /// * `reason` - Why the backend could not be constructed.
    /// * `model_path` - Display form of the configured model path.
    pub fn model_unavailable(reason: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
            model_path: model_path.into(),
        }
    }

    /// Creates a DiagnosisError for a class name missing from the knowledge base.
    ///
    /// # Arguments
    ///
    /// * `class_name` - The class name that missed the lookup.
    pub fn unknown_class(class_name: impl Into<String>) -> Self {
        Self::UnknownClass {
            class_name: class_name.into(),
        }
    }

    /// Creates a DiagnosisError for internal processing operations.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage of the pipeline where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing(
        stage: PipelineStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a DiagnosisError for an internal failure without an underlying error.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage of the pipeline where the error occurred.
    /// * `context` - A message describing the failure.
    pub fn internal(stage: PipelineStage, context: impl Into<String>) -> Self {
        let context = context.into();
        Self::Processing {
            stage,
            source: Box::new(SimpleError::new(context.clone())),
            context,
        }
    }

    /// Creates a DiagnosisError for inference operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn inference(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a DiagnosisError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a DiagnosisError for configuration errors with field context.
    ///
    /// # Arguments
    ///
    /// * `field` - The field where the error occurred.
    /// * `value` - The value of the field.
    /// * `reason` - The reason the value is rejected.
    pub fn config_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::Config {
            message: format!(
                "Configuration error in field '{field}' with value '{value}': {reason}"
            ),
        }
    }

    /// Returns true when the error is corrigible by the caller.
    ///
    /// Decode and validation failures mean the request itself was bad; a
    /// corrected request can succeed against the same pipeline. Everything
    /// else is either fatal at startup or an internal failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Validation { .. })
    }
}
