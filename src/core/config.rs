//! Configuration types for pipeline construction.
//!
//! Each stage of the pipeline is configured by a small struct with sensible
//! defaults and a `validate` method; [`PipelineConfig`] bundles them and is
//! what [`crate::pipeline::DiagnosisPipeline::from_config`] consumes.
//! Configurations can be loaded from JSON for deployments that keep tunables
//! in files.

use crate::core::constants::{
    CONFIDENCE_MEDIUM_THRESHOLD, DEFAULT_HAIR_RESIDUAL_THRESHOLD, DEFAULT_MAX_IMAGE_BYTES,
    LOW_CONFIDENCE_FLOOR, MELANOMA_CRITICAL_THRESHOLD, MELANOMA_HIGH_THRESHOLD,
};
use crate::core::errors::{DiagResult, DiagnosisError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend selection and session settings for the inference engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the trained ONNX artifact. `None` selects the placeholder.
    pub model_path: Option<PathBuf>,
    /// Whether the placeholder backend may stand in when no artifact loads.
    ///
    /// Production deployments set this to false so a missing or broken
    /// artifact fails at startup instead of silently serving pseudo
    /// predictions.
    pub allow_placeholder: bool,
    /// Number of pooled ONNX sessions serving requests round-robin.
    pub session_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            allow_placeholder: true,
            session_pool_size: 1,
        }
    }
}

impl EngineConfig {
    /// Validates the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the session pool is empty.
    pub fn validate(&self) -> DiagResult<()> {
        if self.session_pool_size == 0 {
            return Err(DiagnosisError::config_with_context(
                "session_pool_size",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Tunables for the Dull-Razor preprocessing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Grayscale residual above which a pixel counts as hair.
    pub hair_residual_threshold: u8,
    /// Maximum byte size accepted for an image payload.
    pub max_image_bytes: usize,
    /// Whether hair removal runs at all.
    ///
    /// Disabling it skips straight from decode to resize, matching inputs
    /// that are already depilated or synthetic.
    pub hair_removal: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            hair_residual_threshold: DEFAULT_HAIR_RESIDUAL_THRESHOLD,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            hair_removal: true,
        }
    }
}

impl PreprocessConfig {
    /// Validates the preprocessing configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the residual threshold or byte budget
    /// would mask every pixel or reject every payload.
    pub fn validate(&self) -> DiagResult<()> {
        if self.hair_residual_threshold == 0 {
            return Err(DiagnosisError::config_with_context(
                "hair_residual_threshold",
                "0",
                "a zero threshold marks every pixel as hair",
            ));
        }
        if self.max_image_bytes == 0 {
            return Err(DiagnosisError::config_with_context(
                "max_image_bytes",
                "0",
                "must allow at least one byte",
            ));
        }
        Ok(())
    }
}

/// Probability cut-offs for triage escalation.
///
/// The defaults implement the clinical escalation policy: melanoma mass at
/// or above `melanoma_critical` is CRITICAL, at or above `melanoma_high` is
/// HIGH, any class at or above `confidence_medium` is MEDIUM, and everything
/// else is LOW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TriageThresholds {
    /// Melanoma probability at or above which triage is CRITICAL.
    pub melanoma_critical: f32,
    /// Melanoma probability at or above which triage is HIGH.
    pub melanoma_high: f32,
    /// Top-class confidence at or above which triage is MEDIUM.
    pub confidence_medium: f32,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            melanoma_critical: MELANOMA_CRITICAL_THRESHOLD,
            melanoma_high: MELANOMA_HIGH_THRESHOLD,
            confidence_medium: CONFIDENCE_MEDIUM_THRESHOLD,
        }
    }
}

impl TriageThresholds {
    /// Validates the threshold ordering and bounds.
    ///
    /// Escalation is monotonic in the melanoma probability only while
    /// `melanoma_high` stays at or below `melanoma_critical`.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if any threshold leaves [0, 1] or the
    /// melanoma thresholds are crossed.
    pub fn validate(&self) -> DiagResult<()> {
        for (field, value) in [
            ("melanoma_critical", self.melanoma_critical),
            ("melanoma_high", self.melanoma_high),
            ("confidence_medium", self.confidence_medium),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(DiagnosisError::config_with_context(
                    field,
                    &value.to_string(),
                    "must be a probability in [0, 1]",
                ));
            }
        }
        if self.melanoma_high > self.melanoma_critical {
            return Err(DiagnosisError::config_with_context(
                "melanoma_high",
                &self.melanoma_high.to_string(),
                "must not exceed melanoma_critical",
            ));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Inference backend selection and session settings.
    pub engine: EngineConfig,
    /// Dull-Razor preprocessing tunables.
    pub preprocess: PreprocessConfig,
    /// Triage escalation thresholds.
    pub thresholds: TriageThresholds,
    /// Top confidence below which the pipeline reports low confidence
    /// instead of asserting a diagnosis.
    pub low_confidence_floor: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            preprocess: PreprocessConfig::default(),
            thresholds: TriageThresholds::default(),
            low_confidence_floor: LOW_CONFIDENCE_FLOOR,
        }
    }
}

impl PipelineConfig {
    /// Validates the configuration and every sub-configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `Config` error found.
    pub fn validate(&self) -> DiagResult<()> {
        self.engine.validate()?;
        self.preprocess.validate()?;
        self.thresholds.validate()?;
        if !(0.0..1.0).contains(&self.low_confidence_floor) {
            return Err(DiagnosisError::config_with_context(
                "low_confidence_floor",
                &self.low_confidence_floor.to_string(),
                "must be in [0, 1)",
            ));
        }
        Ok(())
    }

    /// Loads a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the document does not parse or the
    /// parsed values fail validation.
    pub fn from_json(json: &str) -> DiagResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DiagnosisError::config(format!("failed to parse pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
