//! Class probability distributions.

use crate::core::constants::{NUM_CLASSES, SIMPLEX_TOLERANCE};
use crate::core::errors::{DiagResult, DiagnosisError};
use crate::domain::DiseaseClass;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A probability distribution over the four disease classes.
///
/// Values follow the canonical class order. A well-formed vector has every
/// entry in [0, 1] and sums to one within [`SIMPLEX_TOLERANCE`]; both
/// constructors enforce this, so a value of this type is always a valid
/// distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    values: [f32; NUM_CLASSES],
}

impl ProbabilityVector {
    /// Wraps raw probabilities after checking the simplex invariant.
    ///
    /// # Arguments
    ///
    /// * `values` - Per-class probabilities in canonical order.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if any entry leaves [0, 1] or the sum
    /// strays from one beyond the tolerance.
    pub fn new(values: [f32; NUM_CLASSES]) -> DiagResult<Self> {
        let vector = Self { values };
        vector.validate()?;
        Ok(vector)
    }

    /// Normalizes non-negative weights into a distribution.
    ///
    /// Normalization runs in f64 so the downcast entries still sum to one
    /// within tolerance.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the weights are not finite, contain
    /// a negative entry, or sum to zero.
    pub fn from_weights(weights: [f64; NUM_CLASSES]) -> DiagResult<Self> {
        let sum: f64 = weights.iter().sum();
        if !sum.is_finite() || sum <= 0.0 || weights.iter().any(|w| *w < 0.0) {
            return Err(DiagnosisError::validation(format!(
                "cannot normalize weights {weights:?} into a probability distribution"
            )));
        }
        Self::new(weights.map(|w| (w / sum) as f32))
    }

    /// Checks the simplex invariant.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error naming the offending entry or the
    /// off-by sum.
    pub fn validate(&self) -> DiagResult<()> {
        for (class, p) in self.iter() {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(DiagnosisError::validation(format!(
                    "probability for {class} is {p}, expected a value in [0, 1]"
                )));
            }
        }
        let sum: f32 = self.values.iter().sum();
        if (sum - 1.0).abs() > SIMPLEX_TOLERANCE {
            return Err(DiagnosisError::validation(format!(
                "probabilities sum to {sum}, expected 1.0 within {SIMPLEX_TOLERANCE}"
            )));
        }
        Ok(())
    }

    /// Returns the probability of the given class.
    pub fn get(&self, class: DiseaseClass) -> f32 {
        self.values[class.index()]
    }

    /// Returns the probability assigned to melanoma.
    pub fn melanoma(&self) -> f32 {
        self.get(DiseaseClass::Melanoma)
    }

    /// Returns the highest-probability class and its value.
    ///
    /// Ties resolve to the earlier class in canonical order.
    pub fn top(&self) -> (DiseaseClass, f32) {
        let mut best = (DiseaseClass::ALL[0], self.values[0]);
        for (class, p) in self.iter().skip(1) {
            if p > best.1 {
                best = (class, p);
            }
        }
        best
    }

    /// Iterates over (class, probability) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (DiseaseClass, f32)> + '_ {
        DiseaseClass::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Returns the raw values in canonical order.
    pub fn values(&self) -> &[f32; NUM_CLASSES] {
        &self.values
    }
}

/// Serializes as a class-name-keyed map in canonical order.
impl Serialize for ProbabilityVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_CLASSES))?;
        for (class, p) in self.iter() {
            map.serialize_entry(class.name(), &p)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_vector_is_accepted() {
        let vector = ProbabilityVector::new([0.2, 0.2, 0.5, 0.1]).unwrap();
        assert_eq!(vector.melanoma(), 0.5);
        assert_eq!(vector.get(DiseaseClass::Acne), 0.2);
    }

    #[test]
    fn off_simplex_sum_is_rejected() {
        assert!(ProbabilityVector::new([0.3, 0.3, 0.3, 0.3]).is_err());
        assert!(ProbabilityVector::new([0.25, 0.25, 0.25, 0.24]).is_err());
    }

    #[test]
    fn out_of_range_entry_is_rejected() {
        assert!(ProbabilityVector::new([1.2, -0.2, 0.0, 0.0]).is_err());
        assert!(ProbabilityVector::new([f32::NAN, 0.4, 0.3, 0.3]).is_err());
    }

    #[test]
    fn weights_normalize_onto_the_simplex() {
        let vector = ProbabilityVector::from_weights([1.0, 1.0, 1.0, 1.0]).unwrap();
        for (_, p) in vector.iter() {
            assert!((p - 0.25).abs() < 1e-6);
        }

        let vector = ProbabilityVector::from_weights([3.0, 1.0, 4.0, 2.0]).unwrap();
        assert!(vector.validate().is_ok());
        assert_eq!(vector.top().0, DiseaseClass::Melanoma);
    }

    #[test]
    fn degenerate_weights_are_rejected() {
        assert!(ProbabilityVector::from_weights([0.0, 0.0, 0.0, 0.0]).is_err());
        assert!(ProbabilityVector::from_weights([1.0, -1.0, 1.0, 1.0]).is_err());
        assert!(ProbabilityVector::from_weights([f64::INFINITY, 1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn top_breaks_ties_toward_earlier_classes() {
        let vector = ProbabilityVector::new([0.3, 0.3, 0.2, 0.2]).unwrap();
        assert_eq!(vector.top(), (DiseaseClass::Acne, 0.3));

        let vector = ProbabilityVector::new([0.2, 0.3, 0.3, 0.2]).unwrap();
        assert_eq!(vector.top().0, DiseaseClass::CherryAngioma);
    }

    #[test]
    fn serializes_as_ordered_class_map() {
        let vector = ProbabilityVector::new([0.2, 0.08, 0.62, 0.1]).unwrap();
        let json = serde_json::to_string(&vector).unwrap();
        let acne = json.find("Acne").unwrap();
        let cherry = json.find("Cherry Angioma").unwrap();
        let melanoma = json.find("Melanoma").unwrap();
        let psoriasis = json.find("Psoriasis").unwrap();
        assert!(acne < cherry && cherry < melanoma && melanoma < psoriasis);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!((value["Melanoma"].as_f64().unwrap() - 0.62).abs() < 1e-6);
    }
}
