//! Result types handed to the transport layer.

use crate::core::inference::ModelInfo;
use crate::domain::{DiseaseClass, PatientMetadata, ProbabilityVector};
use crate::knowledge::ClinicalRecord;
use crate::triage::TriageAssessment;
use serde::Serialize;

/// Complete diagnosis for one request.
///
/// Built once per request and never mutated. The serialized form is the
/// whole contract with the transport layer; this crate knows nothing about
/// status codes or routing.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisResult {
    /// Class with the highest probability.
    pub predicted_class: DiseaseClass,
    /// Probability of the predicted class.
    pub confidence: f32,
    /// Full distribution over all classes, as an ordered map.
    pub class_probabilities: ProbabilityVector,
    /// Clinical reference entry for the predicted class.
    pub clinical_details: ClinicalRecord,
    /// Severity assessment for human review.
    pub triage: TriageAssessment,
    /// Echo of the metadata supplied with the request.
    pub patient_metadata: PatientMetadata,
    /// Description of the backing model.
    pub model_info: ModelInfo,
}

/// Returned instead of a diagnosis when the top confidence is too low to
/// stand behind.
#[derive(Debug, Clone, Serialize)]
pub struct LowConfidenceReport {
    /// Always `"low_confidence"`, so transport layers can branch on it.
    pub status: &'static str,
    /// The rejected top confidence.
    pub confidence: f32,
    /// Explanation shown to the caller.
    pub message: &'static str,
    /// What the caller can do about it.
    pub suggestion: &'static str,
    /// Full distribution over all classes, for transparency.
    pub class_probabilities: ProbabilityVector,
    /// Echo of the metadata supplied with the request.
    pub patient_metadata: PatientMetadata,
}

impl LowConfidenceReport {
    pub(crate) fn new(
        confidence: f32,
        class_probabilities: ProbabilityVector,
        patient_metadata: PatientMetadata,
    ) -> Self {
        Self {
            status: "low_confidence",
            confidence,
            message: "Unable to make reliable prediction. Image quality may be insufficient.",
            suggestion: "Please upload a clearer, higher-resolution image of the lesion.",
            class_probabilities,
            patient_metadata,
        }
    }
}

/// What a pipeline run hands back on success.
///
/// Serializes without a wrapper tag: a diagnosis keeps the
/// [`DiagnosisResult`] shape and a low-confidence outcome keeps the
/// [`LowConfidenceReport`] shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DiagnosisOutcome {
    /// A confident diagnosis.
    Report(DiagnosisResult),
    /// Confidence fell below the configured floor.
    LowConfidence(LowConfidenceReport),
}

impl DiagnosisOutcome {
    /// Returns the diagnosis when one was produced.
    pub fn as_report(&self) -> Option<&DiagnosisResult> {
        match self {
            DiagnosisOutcome::Report(result) => Some(result),
            DiagnosisOutcome::LowConfidence(_) => None,
        }
    }

    /// True when the outcome is a low-confidence report.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, DiagnosisOutcome::LowConfidence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::InferenceEngine;
    use crate::domain::LesionLocation;
    use crate::knowledge::ClinicalKnowledgeBase;
    use crate::triage::{TriageClassifier, TriageLevel};

    fn melanoma_report() -> DiagnosisResult {
        let probabilities = ProbabilityVector::new([0.20, 0.08, 0.62, 0.10]).unwrap();
        let triage = TriageClassifier::default().classify(&probabilities);
        DiagnosisResult {
            predicted_class: DiseaseClass::Melanoma,
            confidence: 0.62,
            class_probabilities: probabilities,
            clinical_details: *ClinicalKnowledgeBase::global().record(DiseaseClass::Melanoma),
            triage,
            patient_metadata: PatientMetadata::new()
                .with_age(42)
                .with_lesion_location(LesionLocation::Back),
            model_info: InferenceEngine::with_placeholder().model_info(),
        }
    }

    #[test]
    fn melanoma_distribution_escalates_through_assembly() {
        let probabilities = ProbabilityVector::new([0.20, 0.08, 0.62, 0.10]).unwrap();
        let (class, confidence) = probabilities.top();
        assert_eq!(class, DiseaseClass::Melanoma);
        assert_eq!(confidence, 0.62);
        let sum: f32 = probabilities.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let triage = TriageClassifier::default().classify(&probabilities);
        assert_eq!(triage.level, TriageLevel::Critical);
        assert!(triage.requires_immediate_attention);
        assert_eq!(triage.melanoma_probability, 0.62);

        let record = ClinicalKnowledgeBase::global().lookup(class.name()).unwrap();
        assert_eq!(record.name, "Melanoma");
    }

    #[test]
    fn report_serializes_the_full_contract() {
        let value = serde_json::to_value(melanoma_report()).unwrap();
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
        assert_eq!(value["predicted_class"], "Melanoma");
        assert_eq!(value["triage"]["level"], "CRITICAL");
        assert_eq!(value["triage"]["requires_immediate_attention"], true);
        assert_eq!(value["patient_metadata"]["age"], 42);
        assert_eq!(value["patient_metadata"]["lesion_location"], "Back");
        assert_eq!(value["model_info"]["using_placeholder"], true);
        assert_eq!(value["clinical_details"]["name"], "Melanoma");
    }

    #[test]
    fn low_confidence_report_keeps_the_original_shape() {
        let probabilities = ProbabilityVector::new([0.28, 0.26, 0.24, 0.22]).unwrap();
        let report = LowConfidenceReport::new(0.28, probabilities, PatientMetadata::new());
        let value = serde_json::to_value(&report).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "class_probabilities",
                "confidence",
                "message",
                "patient_metadata",
                "status",
                "suggestion",
            ]
        );
        assert_eq!(value["status"], "low_confidence");
        assert_eq!(
            value["message"],
            "Unable to make reliable prediction. Image quality may be insufficient."
        );
        assert_eq!(
            value["suggestion"],
            "Please upload a clearer, higher-resolution image of the lesion."
        );
    }

    #[test]
    fn outcome_serializes_without_a_wrapper_tag() {
        let report = DiagnosisOutcome::Report(melanoma_report());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("predicted_class").is_some());
        assert!(value.get("Report").is_none());

        let probabilities = ProbabilityVector::new([0.28, 0.26, 0.24, 0.22]).unwrap();
        let low = DiagnosisOutcome::LowConfidence(LowConfidenceReport::new(
            0.28,
            probabilities,
            PatientMetadata::new(),
        ));
        let value = serde_json::to_value(&low).unwrap();
        assert_eq!(value["status"], "low_confidence");
        assert!(value.get("LowConfidence").is_none());
    }

    #[test]
    fn outcome_accessors_distinguish_the_variants() {
        let report = DiagnosisOutcome::Report(melanoma_report());
        assert!(report.as_report().is_some());
        assert!(!report.is_low_confidence());

        let probabilities = ProbabilityVector::new([0.28, 0.26, 0.24, 0.22]).unwrap();
        let low = DiagnosisOutcome::LowConfidence(LowConfidenceReport::new(
            0.28,
            probabilities,
            PatientMetadata::new(),
        ));
        assert!(low.as_report().is_none());
        assert!(low.is_low_confidence());
    }
}
