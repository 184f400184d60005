//! Disease classes recognized by the classifier.

use crate::core::constants::NUM_CLASSES;
use serde::{Deserialize, Serialize};

/// The four lesion categories the classifier distinguishes.
///
/// The declaration order is canonical: it matches the class axis of the
/// model output, the order of [`ProbabilityVector`](crate::domain::ProbabilityVector)
/// entries, and the serialization order of probability maps. Changing it
/// would silently remap every prediction, so new classes go at the end of
/// a retrained model's axis, never in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseClass {
    /// Inflammatory follicular condition, mostly benign.
    Acne,
    /// Benign vascular papule.
    #[serde(rename = "Cherry Angioma")]
    CherryAngioma,
    /// Malignant melanocytic neoplasm; the class triage exists for.
    Melanoma,
    /// Chronic autoimmune plaque condition.
    Psoriasis,
}

impl DiseaseClass {
    /// All classes in canonical order.
    pub const ALL: [DiseaseClass; NUM_CLASSES] = [
        DiseaseClass::Acne,
        DiseaseClass::CherryAngioma,
        DiseaseClass::Melanoma,
        DiseaseClass::Psoriasis,
    ];

    /// Returns the display name reported to callers.
    pub fn name(&self) -> &'static str {
        match self {
            DiseaseClass::Acne => "Acne",
            DiseaseClass::CherryAngioma => "Cherry Angioma",
            DiseaseClass::Melanoma => "Melanoma",
            DiseaseClass::Psoriasis => "Psoriasis",
        }
    }

    /// Returns the position of the class on the model output axis.
    pub fn index(&self) -> usize {
        match self {
            DiseaseClass::Acne => 0,
            DiseaseClass::CherryAngioma => 1,
            DiseaseClass::Melanoma => 2,
            DiseaseClass::Psoriasis => 3,
        }
    }

    /// Returns the class at the given model output position.
    pub fn from_index(index: usize) -> Option<DiseaseClass> {
        Self::ALL.get(index).copied()
    }

    /// Parses a display name back into a class.
    ///
    /// Matching is exact; the canonical names are part of the output
    /// contract and never vary in case or spacing.
    pub fn from_name(name: &str) -> Option<DiseaseClass> {
        Self::ALL.iter().copied().find(|class| class.name() == name)
    }
}

impl std::fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_stable() {
        let names: Vec<&str> = DiseaseClass::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Acne", "Cherry Angioma", "Melanoma", "Psoriasis"]);
    }

    #[test]
    fn index_round_trips() {
        for class in DiseaseClass::ALL {
            assert_eq!(DiseaseClass::from_index(class.index()), Some(class));
        }
        assert_eq!(DiseaseClass::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn name_round_trips() {
        for class in DiseaseClass::ALL {
            assert_eq!(DiseaseClass::from_name(class.name()), Some(class));
        }
        assert_eq!(DiseaseClass::from_name("Eczema"), None);
        assert_eq!(DiseaseClass::from_name("melanoma"), None);
    }

    #[test]
    fn serialization_uses_display_names() {
        let json = serde_json::to_string(&DiseaseClass::CherryAngioma).unwrap();
        assert_eq!(json, "\"Cherry Angioma\"");
    }
}
