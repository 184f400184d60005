//! Deterministic fallback backend used when no model artifact is present.
//!
//! Development and CI environments rarely carry the trained model file. To
//! keep the rest of the pipeline exercisable, this backend derives a
//! probability distribution from the tensor content itself: the tensor is
//! hashed, the hash seeds a small deterministic generator, and four positive
//! weights are drawn and normalized. Identical tensors therefore always map
//! to identical distributions while different tensors spread across the
//! simplex.

use crate::core::constants::NUM_CLASSES;
use crate::core::errors::DiagResult;
use crate::core::tensor::ImageTensor;
use crate::domain::ProbabilityVector;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Content-seeded stand-in for the trained classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

impl PlaceholderBackend {
    /// Produces a probability distribution derived from the tensor content.
    ///
    /// The tensor elements are hashed with SHA-256 in logical row-major
    /// order, each value as its four little-endian bytes. The digest seeds a
    /// ChaCha8 stream from which one `u32` per class is drawn in canonical
    /// class order; each word plus one becomes a weight, and the weights are
    /// normalized in `f64`. The draw count is fixed, so the mapping from
    /// tensor to distribution is stable across runs and platforms.
    pub fn predict(&self, tensor: &ImageTensor) -> DiagResult<ProbabilityVector> {
        let mut hasher = Sha256::new();
        for value in tensor.iter() {
            hasher.update(value.to_le_bytes());
        }
        let mut rng = ChaCha8Rng::from_seed(hasher.finalize().into());

        let mut weights = [0.0f64; NUM_CLASSES];
        for weight in &mut weights {
            *weight = f64::from(rng.next_u32()) + 1.0;
        }
        ProbabilityVector::from_weights(weights)
    }
}
