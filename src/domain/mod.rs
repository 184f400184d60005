//! Domain-level structures shared across the diagnosis pipeline.
//!
//! This module groups the dermatology-specific concepts used throughout the
//! crate: the closed set of disease classes, the probability simplex the
//! model emits over them, and the optional patient metadata accepted with a
//! request.

pub mod classes;
pub mod metadata;
pub mod probability;

pub use classes::DiseaseClass;
pub use metadata::{LesionLocation, PatientMetadata};
pub use probability::ProbabilityVector;
