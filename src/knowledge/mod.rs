//! Static clinical knowledge base.
//!
//! Maps each supported disease class to its clinical record: definition,
//! characteristic findings, and a severity label. The table is built once at
//! first use and shared read-only across all requests. A lookup miss means
//! the class list and the knowledge base have drifted apart, which is a
//! build-time defect, so it fails loudly instead of returning a default
//! record.

use crate::core::constants::NUM_CLASSES;
use crate::core::errors::{DiagResult, DiagnosisError};
use crate::domain::DiseaseClass;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::error;

/// Clinical reference entry for one disease class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClinicalRecord {
    /// Display name, identical to the class label.
    pub name: &'static str,
    /// Clinical definition of the condition.
    pub definition: &'static str,
    /// Characteristic findings, in presentation order.
    pub characteristics: &'static [&'static str],
    /// Severity label shown to the caller.
    pub severity: &'static str,
}

/// Read-only table of clinical records, one per supported class.
#[derive(Debug)]
pub struct ClinicalKnowledgeBase {
    records: [ClinicalRecord; NUM_CLASSES],
}

static KNOWLEDGE_BASE: Lazy<ClinicalKnowledgeBase> = Lazy::new(ClinicalKnowledgeBase::new);

impl ClinicalKnowledgeBase {
    /// Returns the process-wide shared table.
    pub fn global() -> &'static ClinicalKnowledgeBase {
        &KNOWLEDGE_BASE
    }

    fn new() -> Self {
        let records = [
            ClinicalRecord {
                name: "Acne",
                definition: "Inflammatory skin condition characterized by comedones, \
                             papules, pustules, and nodules. Common in adolescents and \
                             young adults, primarily affecting face, chest, and back.",
                characteristics: &[
                    "Comedones (blackheads/whiteheads)",
                    "Inflammatory pustules",
                    "Possible scarring",
                ],
                severity: "Low to Moderate",
            },
            ClinicalRecord {
                name: "Cherry Angioma",
                definition: "Benign vascular lesions appearing as bright red papules. \
                             Common in adults, typically harmless proliferations of \
                             capillaries.",
                characteristics: &["Bright red color", "Dome-shaped papules", "1-5mm diameter"],
                severity: "Benign",
            },
            ClinicalRecord {
                name: "Melanoma",
                definition: "Malignant melanocytic neoplasm with irregular borders and \
                             color variation. Most dangerous form of skin cancer requiring \
                             immediate medical attention.",
                characteristics: &[
                    "Asymmetric shape",
                    "Irregular borders",
                    "Color variation",
                    "Diameter > 6mm",
                    "Evolving appearance",
                ],
                severity: "Critical - Requires Immediate Medical Attention",
            },
            ClinicalRecord {
                name: "Psoriasis",
                definition: "Chronic autoimmune condition presenting as red color, scaly \
                             plaques with well-defined edges. Commonly affects elbows, \
                             knees, and scalp.",
                characteristics: &[
                    "Red plaques",
                    "Silvery scales",
                    "Well-defined edges",
                    "Symmetrical distribution",
                ],
                severity: "Moderate - Chronic Condition",
            },
        ];
        Self { records }
    }

    /// Returns the record for a known class. Infallible by construction
    /// since the table covers every `DiseaseClass` variant.
    pub fn record(&self, class: DiseaseClass) -> &ClinicalRecord {
        &self.records[class.index()]
    }

    /// Looks up a record by exact class name.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError::UnknownClass`] when the name is outside the
    /// supported set. This indicates a class-list mismatch and is logged as
    /// an error before being returned.
    pub fn lookup(&self, class_name: &str) -> DiagResult<&ClinicalRecord> {
        match self.records.iter().find(|record| record.name == class_name) {
            Some(record) => Ok(record),
            None => {
                error!(
                    class_name = class_name,
                    "clinical knowledge base has no record for predicted class"
                );
                Err(DiagnosisError::unknown_class(class_name))
            }
        }
    }

    /// Names of all classes the table covers, in canonical order.
    pub fn available_classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.records.iter().map(|record| record.name)
    }
}
