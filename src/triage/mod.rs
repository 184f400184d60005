//! Melanoma-focused triage classification.
//!
//! Assigns a severity level to a probability vector so a human reviewer can
//! prioritize cases. Melanoma probability drives the two urgent bands on its
//! own; overall prediction confidence only distinguishes the two routine
//! bands. The classifier is a pure function of the probabilities and the
//! configured thresholds.

use crate::core::config::TriageThresholds;
use crate::core::errors::DiagResult;
use crate::domain::ProbabilityVector;
use serde::{Deserialize, Serialize};

/// Severity bands, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageLevel {
    /// Routine monitoring is sufficient.
    Low,
    /// A confident non-melanoma prediction worth a consultation.
    Medium,
    /// Melanoma probability warrants a dermatologist referral.
    High,
    /// Melanoma probability warrants immediate human review.
    Critical,
}

impl TriageLevel {
    /// Returns the wire form of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLevel::Low => "LOW",
            TriageLevel::Medium => "MEDIUM",
            TriageLevel::High => "HIGH",
            TriageLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of triage for one prediction. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageAssessment {
    /// Assigned severity band.
    pub level: TriageLevel,
    /// Human-readable summary embedding the melanoma percentage.
    pub message: String,
    /// True exactly for the `High` and `Critical` bands.
    pub requires_immediate_attention: bool,
    /// Melanoma probability the banding was derived from.
    pub melanoma_probability: f32,
}

/// Assigns triage levels from class probabilities.
#[derive(Debug, Clone, Default)]
pub struct TriageClassifier {
    thresholds: TriageThresholds,
}

impl TriageClassifier {
    /// Creates a classifier with the given thresholds.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the thresholds fail validation.
    pub fn new(thresholds: TriageThresholds) -> DiagResult<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Classifies a probability vector into a triage assessment.
    ///
    /// Rules apply first-match: melanoma at or above the critical threshold
    /// is `Critical`, at or above the high threshold is `High`; otherwise a
    /// top confidence at or above the medium threshold is `Medium`, and
    /// everything else is `Low`. Scaling melanoma up while the non-melanoma
    /// proportions stay fixed never lowers the resulting level.
    pub fn classify(&self, probabilities: &ProbabilityVector) -> TriageAssessment {
        let melanoma_probability = probabilities.melanoma();
        let (_, top_confidence) = probabilities.top();

        let level = if melanoma_probability >= self.thresholds.melanoma_critical {
            TriageLevel::Critical
        } else if melanoma_probability >= self.thresholds.melanoma_high {
            TriageLevel::High
        } else if top_confidence >= self.thresholds.confidence_medium {
            TriageLevel::Medium
        } else {
            TriageLevel::Low
        };

        TriageAssessment {
            level,
            message: Self::message_for(level, melanoma_probability),
            requires_immediate_attention: level >= TriageLevel::High,
            melanoma_probability,
        }
    }

    fn message_for(level: TriageLevel, melanoma_probability: f32) -> String {
        let percent = f64::from(melanoma_probability) * 100.0;
        match level {
            TriageLevel::Critical => format!(
                "URGENT: flagged for immediate human review - melanoma probability {percent:.1}%"
            ),
            TriageLevel::High => format!(
                "High priority: recommend professional dermatologist consultation - melanoma probability {percent:.1}%"
            ),
            TriageLevel::Medium => format!(
                "Moderate priority: consider professional consultation - melanoma probability {percent:.1}%"
            ),
            TriageLevel::Low => format!(
                "Low priority: monitor condition and consult if symptoms persist - melanoma probability {percent:.1}%"
            ),
        }
    }
}
