//! Patient metadata accepted alongside an image.

use crate::core::constants::MAX_PATIENT_AGE;
use crate::core::errors::{DiagResult, DiagnosisError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Body sites accepted for a lesion location.
///
/// The list is fixed; free-text locations are rejected at the boundary so
/// downstream consumers can rely on the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LesionLocation {
    Face,
    Chest,
    Back,
    Arms,
    Legs,
    Hands,
    Feet,
    Scalp,
    Neck,
    Other,
}

impl LesionLocation {
    /// All accepted locations.
    pub const ALL: [LesionLocation; 10] = [
        LesionLocation::Face,
        LesionLocation::Chest,
        LesionLocation::Back,
        LesionLocation::Arms,
        LesionLocation::Legs,
        LesionLocation::Hands,
        LesionLocation::Feet,
        LesionLocation::Scalp,
        LesionLocation::Neck,
        LesionLocation::Other,
    ];

    /// Returns the display name of the location.
    pub fn as_str(&self) -> &'static str {
        match self {
            LesionLocation::Face => "Face",
            LesionLocation::Chest => "Chest",
            LesionLocation::Back => "Back",
            LesionLocation::Arms => "Arms",
            LesionLocation::Legs => "Legs",
            LesionLocation::Hands => "Hands",
            LesionLocation::Feet => "Feet",
            LesionLocation::Scalp => "Scalp",
            LesionLocation::Neck => "Neck",
            LesionLocation::Other => "Other",
        }
    }
}

impl std::fmt::Display for LesionLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LesionLocation {
    type Err = DiagnosisError;

    /// Parses a location name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|location| location.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|l| l.as_str()).collect();
                DiagnosisError::validation(format!(
                    "invalid lesion location '{s}', allowed locations: {}",
                    allowed.join(", ")
                ))
            })
    }
}

/// Optional demographic context accepted with a request.
///
/// Both fields are validated and echoed back in the result for the caller's
/// record keeping. Neither currently influences the prediction or the triage
/// level; the classifier is image-only, and inventing a metadata effect here
/// would misrepresent the model. Revisit when a model trained on metadata
/// ships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientMetadata {
    /// Patient age in years, if provided.
    pub age: Option<u32>,
    /// Body site of the lesion, if provided.
    pub lesion_location: Option<LesionLocation>,
}

impl PatientMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the patient age.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the lesion location.
    pub fn with_lesion_location(mut self, location: LesionLocation) -> Self {
        self.lesion_location = Some(location);
        self
    }

    /// Checks the age range.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error when the age exceeds
    /// [`MAX_PATIENT_AGE`].
    pub fn validate(&self) -> DiagResult<()> {
        if let Some(age) = self.age {
            if age > MAX_PATIENT_AGE {
                return Err(DiagnosisError::validation(format!(
                    "age must be between 0 and {MAX_PATIENT_AGE}, got {age}"
                )));
            }
        }
        Ok(())
    }
}
