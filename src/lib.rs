//! # Derm Triage
//!
//! A Rust library that classifies skin lesion photographs into four disease
//! classes and derives a melanoma-focused triage assessment. Supports ONNX
//! model inference with a deterministic placeholder fallback, Dull-Razor
//! hair artifact removal, and clinical record lookup.
//!
//! ## Features
//!
//! - Complete diagnosis pipeline from image bytes to a serializable result
//! - Dull-Razor preprocessing: hair detection and inpainting
//! - ONNX Runtime integration with session pooling
//! - Deterministic placeholder backend when no model artifact is present
//! - Melanoma-focused triage levels for human-in-the-loop review
//! - Static clinical knowledge base covering the supported classes
//! - Batch processing with parallel execution above a threshold
//!
//! ## Components
//!
//! - **Preprocessing**: Decode, validate, remove hair artifacts, resize,
//!   and scale to the model input tensor
//! - **Inference**: Produce a probability distribution over the four
//!   disease classes
//! - **Triage**: Map probabilities to LOW/MEDIUM/HIGH/CRITICAL severity
//! - **Knowledge Base**: Attach the clinical record of the predicted class
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, errors, tensors, and inference
//! * [`domain`] - Disease classes, probability vectors, patient metadata
//! * [`knowledge`] - Static clinical knowledge base
//! * [`pipeline`] - The end-to-end diagnosis pipeline
//! * [`processors`] - Image preprocessing stages
//! * [`triage`] - Severity classification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use derm_triage::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = DiagnosisPipeline::builder()
//!     .model_path("models/skin_disease_model.onnx")
//!     .build()?;
//!
//! let image = std::fs::read("lesion.jpg")?;
//! let metadata = PatientMetadata::new()
//!     .with_age(42)
//!     .with_lesion_location(LesionLocation::Back);
//!
//! match pipeline.diagnose(&image, metadata)? {
//!     DiagnosisOutcome::Report(result) => {
//!         println!("{} ({:.1}%)", result.predicted_class, result.confidence * 100.0);
//!         println!("{}", result.triage.message);
//!     }
//!     DiagnosisOutcome::LowConfidence(report) => {
//!         println!("{} {}", report.message, report.suggestion);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## JSON Configuration
//!
//! ```rust,no_run
//! use derm_triage::core::PipelineConfig;
//! use derm_triage::pipeline::DiagnosisPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_json(r#"
//! {
//!   "engine": {
//!     "model_path": "models/skin_disease_model.onnx",
//!     "allow_placeholder": true,
//!     "session_pool_size": 2
//!   },
//!   "preprocess": {
//!     "hair_residual_threshold": 10,
//!     "max_image_bytes": 10485760,
//!     "hair_removal": true
//!   },
//!   "thresholds": {
//!     "melanoma_critical": 0.5,
//!     "melanoma_high": 0.3,
//!     "confidence_medium": 0.7
//!   },
//!   "low_confidence_floor": 0.3
//! }
//! "#)?;
//!
//! let pipeline = DiagnosisPipeline::from_config(config)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod knowledge;
pub mod pipeline;
pub mod processors;
pub mod triage;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use derm_triage::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - The pipeline (`DiagnosisPipeline`, `DiagnosisPipelineBuilder`, `CancelToken`)
/// - Outcomes (`DiagnosisOutcome`, `DiagnosisResult`, `LowConfidenceReport`)
/// - Request inputs (`PatientMetadata`, `LesionLocation`)
/// - Triage types (`TriageAssessment`, `TriageLevel`)
/// - Essential error and result types (`DiagnosisError`, `DiagResult`)
///
/// For advanced customization (engine configuration, preprocessing stages,
/// the knowledge base), import directly from the respective modules (e.g.,
/// `derm_triage::core`, `derm_triage::processors`, `derm_triage::knowledge`).
pub mod prelude {
    pub use crate::pipeline::{
        CancelToken, DiagnosisOutcome, DiagnosisPipeline, DiagnosisPipelineBuilder,
        DiagnosisResult, LowConfidenceReport,
    };

    pub use crate::domain::{DiseaseClass, LesionLocation, PatientMetadata, ProbabilityVector};

    pub use crate::triage::{TriageAssessment, TriageLevel};

    pub use crate::core::{DiagResult, DiagnosisError};
}
