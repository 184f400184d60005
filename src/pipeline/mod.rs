//! The diagnosis pipeline module.
//!
//! This module provides the main pipeline implementation that combines the
//! preprocessing stages, the inference engine, the triage classifier, and
//! the clinical knowledge base into a single request-scoped flow: raw image
//! bytes and optional patient metadata in, a complete diagnosis or a
//! low-confidence report out.

mod result;

pub use result::{DiagnosisOutcome, DiagnosisResult, LowConfidenceReport};

use crate::core::config::{EngineConfig, PipelineConfig, PreprocessConfig, TriageThresholds};
use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::{DiagResult, DiagnosisError};
use crate::core::inference::InferenceEngine;
use crate::domain::PatientMetadata;
use crate::knowledge::ClinicalKnowledgeBase;
use crate::processors::DullRazorPreprocessor;
use crate::triage::TriageClassifier;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Cooperative cancellation handle for in-flight diagnoses.
///
/// Clones share one flag. The pipeline checks the flag once, between
/// preprocessing and inference; a cancelled request aborts with
/// [`DiagnosisError::Aborted`] and never yields a partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// End-to-end diagnosis pipeline.
///
/// Holds no per-request state: every method takes `&self` and the struct is
/// `Send + Sync`, so one pipeline can serve concurrent callers.
#[derive(Debug)]
pub struct DiagnosisPipeline {
    preprocessor: DullRazorPreprocessor,
    engine: InferenceEngine,
    triage: TriageClassifier,
    knowledge: &'static ClinicalKnowledgeBase,
    low_confidence_floor: f32,
    parallel_threshold: usize,
}

impl DiagnosisPipeline {
    /// Creates a pipeline with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError::ModelUnavailable`] when no usable inference
    /// backend can be constructed.
    pub fn new() -> DiagResult<Self> {
        Self::from_config(PipelineConfig::default())
    }

    /// Creates a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for an invalid configuration and
    /// [`DiagnosisError::ModelUnavailable`] when no usable inference backend
    /// can be constructed.
    pub fn from_config(config: PipelineConfig) -> DiagResult<Self> {
        config.validate()?;
        let engine = InferenceEngine::from_config(&config.engine)?;
        info!(
            using_placeholder = engine.is_placeholder(),
            "diagnosis pipeline ready"
        );
        Ok(Self {
            preprocessor: DullRazorPreprocessor::new(&config.preprocess),
            engine,
            triage: TriageClassifier::new(config.thresholds)?,
            knowledge: ClinicalKnowledgeBase::global(),
            low_confidence_floor: config.low_confidence_floor,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Starts a fluent builder over the pipeline configuration.
    pub fn builder() -> DiagnosisPipelineBuilder {
        DiagnosisPipelineBuilder::new()
    }

    /// Diagnoses one image.
    ///
    /// Runs metadata validation, preprocessing, inference, triage, and the
    /// clinical lookup in order. Any stage error short-circuits the request;
    /// no partial or guessed result is ever returned.
    ///
    /// # Errors
    ///
    /// `Decode` and `Validation` errors mean the request was malformed.
    /// Everything else is internal.
    pub fn diagnose(
        &self,
        image: &[u8],
        metadata: PatientMetadata,
    ) -> DiagResult<DiagnosisOutcome> {
        self.run(image, metadata, None)
    }

    /// Diagnoses one image with a cancellation token.
    ///
    /// The token is checked once, between preprocessing and inference.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError::Aborted`] when the token was cancelled, in
    /// addition to the errors `diagnose` can return.
    pub fn diagnose_with_cancel(
        &self,
        image: &[u8],
        metadata: PatientMetadata,
        cancel: &CancelToken,
    ) -> DiagResult<DiagnosisOutcome> {
        self.run(image, metadata, Some(cancel))
    }

    /// Diagnoses a batch of images, one result per request.
    ///
    /// Requests are processed in parallel once the batch exceeds the
    /// parallel threshold. Results keep the request order, and one failed
    /// request never affects the others.
    pub fn diagnose_batch<B: AsRef<[u8]> + Sync>(
        &self,
        requests: &[(B, PatientMetadata)],
    ) -> Vec<DiagResult<DiagnosisOutcome>> {
        if requests.len() > self.parallel_threshold {
            use rayon::prelude::*;
            requests
                .par_iter()
                .map(|(bytes, metadata)| self.diagnose(bytes.as_ref(), metadata.clone()))
                .collect()
        } else {
            requests
                .iter()
                .map(|(bytes, metadata)| self.diagnose(bytes.as_ref(), metadata.clone()))
                .collect()
        }
    }

    /// True when predictions come from the placeholder backend.
    pub fn is_placeholder(&self) -> bool {
        self.engine.is_placeholder()
    }

    fn run(
        &self,
        image: &[u8],
        metadata: PatientMetadata,
        cancel: Option<&CancelToken>,
    ) -> DiagResult<DiagnosisOutcome> {
        metadata.validate()?;

        let tensor = self.preprocessor.preprocess(image)?;

        if let Some(token) = cancel {
            if token.is_cancelled() {
                debug!("diagnosis aborted between preprocessing and inference");
                return Err(DiagnosisError::Aborted);
            }
        }

        let prediction = self.engine.predict(&tensor)?;

        if prediction.confidence < self.low_confidence_floor {
            info!(
                confidence = prediction.confidence,
                floor = self.low_confidence_floor,
                "prediction confidence below the floor, returning low-confidence report"
            );
            return Ok(DiagnosisOutcome::LowConfidence(LowConfidenceReport::new(
                prediction.confidence,
                prediction.probabilities,
                metadata,
            )));
        }

        let triage = self.triage.classify(&prediction.probabilities);
        let clinical_details = *self.knowledge.lookup(prediction.class.name())?;

        let result = DiagnosisResult {
            predicted_class: prediction.class,
            confidence: prediction.confidence,
            class_probabilities: prediction.probabilities,
            clinical_details,
            triage,
            patient_metadata: metadata,
            model_info: self.engine.model_info(),
        };
        info!(
            predicted_class = %result.predicted_class,
            confidence = result.confidence,
            triage_level = %result.triage.level,
            "diagnosis complete"
        );
        Ok(DiagnosisOutcome::Report(result))
    }
}

/// Fluent builder for [`DiagnosisPipeline`].
#[derive(Debug, Default)]
pub struct DiagnosisPipelineBuilder {
    config: PipelineConfig,
    parallel_threshold: Option<usize>,
}

impl DiagnosisPipelineBuilder {
    /// Creates a builder seeded with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path of the trained model file.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.engine.model_path = Some(path.into());
        self
    }

    /// Allows or forbids the placeholder fallback when the model is missing.
    pub fn allow_placeholder(mut self, allow: bool) -> Self {
        self.config.engine.allow_placeholder = allow;
        self
    }

    /// Sets the ONNX session pool size.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.engine.session_pool_size = size;
        self
    }

    /// Replaces the engine configuration wholesale.
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.config.engine = config;
        self
    }

    /// Replaces the preprocessing configuration.
    pub fn preprocess_config(mut self, config: PreprocessConfig) -> Self {
        self.config.preprocess = config;
        self
    }

    /// Replaces the triage thresholds.
    pub fn triage_thresholds(mut self, thresholds: TriageThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Sets the confidence floor below which a low-confidence report is
    /// returned instead of a diagnosis.
    pub fn low_confidence_floor(mut self, floor: f32) -> Self {
        self.config.low_confidence_floor = floor;
        self
    }

    /// Sets the batch size above which `diagnose_batch` runs in parallel.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Validates the configuration and constructs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for an invalid configuration and
    /// [`DiagnosisError::ModelUnavailable`] when no usable inference backend
    /// can be constructed.
    pub fn build(self) -> DiagResult<DiagnosisPipeline> {
        let mut pipeline = DiagnosisPipeline::from_config(self.config)?;
        if let Some(threshold) = self.parallel_threshold {
            pipeline.parallel_threshold = threshold;
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LesionLocation;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn lesion_png(seed: u8) -> Vec<u8> {
        let image = RgbImage::from_fn(150, 150, |x, y| {
            Rgb([
                seed.wrapping_add((x % 200) as u8),
                seed.wrapping_add((y % 200) as u8),
                seed.wrapping_add(((x + y) % 200) as u8),
            ])
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([150, 110, 100]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn confident_pipeline() -> DiagnosisPipeline {
        DiagnosisPipeline::builder()
            .low_confidence_floor(0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn two_runs_produce_identical_outcomes() {
        let pipeline = DiagnosisPipeline::new().unwrap();
        let bytes = lesion_png(10);
        let metadata = PatientMetadata::new().with_age(30);
        let first = pipeline.diagnose(&bytes, metadata.clone()).unwrap();
        let second = pipeline.diagnose(&bytes, metadata).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn report_honors_the_output_contract() {
        let outcome = confident_pipeline()
            .diagnose(&lesion_png(40), PatientMetadata::new())
            .unwrap();
        let report = outcome.as_report().expect("floor of 0.0 always reports");

        let value = serde_json::to_value(report).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "class_probabilities",
                "clinical_details",
                "confidence",
                "model_info",
                "patient_metadata",
                "predicted_class",
                "triage",
            ]
        );

        let probabilities = value["class_probabilities"].as_object().unwrap();
        assert_eq!(probabilities.len(), 4);
        let sum: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let triage = value["triage"].as_object().unwrap();
        assert!(triage.contains_key("level"));
        assert!(triage.contains_key("message"));
        assert!(triage.contains_key("requires_immediate_attention"));
        assert!(triage.contains_key("melanoma_probability"));
        assert_eq!(value["model_info"]["using_placeholder"], true);
    }

    #[test]
    fn metadata_is_echoed_back() {
        let metadata = PatientMetadata::new()
            .with_age(42)
            .with_lesion_location(LesionLocation::Back);
        let outcome = confident_pipeline()
            .diagnose(&lesion_png(77), metadata)
            .unwrap();
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["patient_metadata"]["age"], 42);
        assert_eq!(value["patient_metadata"]["lesion_location"], "Back");
    }

    #[test]
    fn undersized_image_is_a_caller_error() {
        let error = DiagnosisPipeline::new()
            .unwrap()
            .diagnose(&solid_png(99, 99), PatientMetadata::new())
            .unwrap_err();
        assert!(error.is_caller_error());
        assert!(error.to_string().contains("resolution too low"));
    }

    #[test]
    fn tiny_image_is_reported_as_corrupted() {
        let error = DiagnosisPipeline::new()
            .unwrap()
            .diagnose(&solid_png(40, 40), PatientMetadata::new())
            .unwrap_err();
        assert!(error.is_caller_error());
        assert!(error.to_string().contains("corrupted"));
    }

    #[test]
    fn boundary_resolution_is_accepted() {
        let outcome = DiagnosisPipeline::new()
            .unwrap()
            .diagnose(&solid_png(100, 100), PatientMetadata::new());
        assert!(outcome.is_ok());
    }

    #[test]
    fn out_of_range_age_is_rejected_before_any_pixel_work() {
        let error = DiagnosisPipeline::new()
            .unwrap()
            .diagnose(b"not even an image", PatientMetadata::new().with_age(151))
            .unwrap_err();
        match error {
            DiagnosisError::Validation { message } => assert!(message.contains("150")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_token_aborts_the_request() {
        let pipeline = DiagnosisPipeline::new().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let error = pipeline
            .diagnose_with_cancel(&lesion_png(5), PatientMetadata::new(), &token)
            .unwrap_err();
        assert!(matches!(error, DiagnosisError::Aborted));
    }

    #[test]
    fn fresh_token_does_not_interfere() {
        let pipeline = DiagnosisPipeline::new().unwrap();
        let token = CancelToken::new();
        let outcome =
            pipeline.diagnose_with_cancel(&lesion_png(5), PatientMetadata::new(), &token);
        assert!(outcome.is_ok());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn low_confidence_floor_routes_to_the_report() {
        let pipeline = DiagnosisPipeline::builder()
            .low_confidence_floor(0.999)
            .build()
            .unwrap();
        let outcome = pipeline
            .diagnose(&lesion_png(90), PatientMetadata::new())
            .unwrap();
        assert!(outcome.is_low_confidence());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "low_confidence");
        assert!(value.get("predicted_class").is_none());
        assert!(value.get("triage").is_none());
    }

    #[test]
    fn batch_results_match_individual_runs() {
        let pipeline = confident_pipeline();
        let requests: Vec<(Vec<u8>, PatientMetadata)> = (0..6)
            .map(|i| (lesion_png(i * 20), PatientMetadata::new()))
            .collect();

        let batch = pipeline.diagnose_batch(&requests);
        assert_eq!(batch.len(), 6);
        for ((bytes, metadata), outcome) in requests.iter().zip(&batch) {
            let single = pipeline.diagnose(bytes, metadata.clone()).unwrap();
            let batched = outcome.as_ref().expect("batch entry should succeed");
            assert_eq!(
                serde_json::to_value(batched).unwrap(),
                serde_json::to_value(&single).unwrap()
            );
        }
    }

    #[test]
    fn batch_keeps_per_request_failures_isolated() {
        let pipeline = confident_pipeline();
        let requests: Vec<(Vec<u8>, PatientMetadata)> = vec![
            (lesion_png(1), PatientMetadata::new()),
            (b"broken payload".to_vec(), PatientMetadata::new()),
            (lesion_png(2), PatientMetadata::new()),
        ];
        let batch = pipeline.diagnose_batch(&requests);
        assert!(batch[0].is_ok());
        assert!(batch[1].is_err());
        assert!(batch[2].is_ok());
    }

    #[test]
    fn invalid_builder_configuration_is_rejected() {
        let error = DiagnosisPipeline::builder()
            .session_pool_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(error, DiagnosisError::Config { .. }));
    }

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiagnosisPipeline>();
    }
}
