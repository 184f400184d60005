//! Image processing stages for the diagnosis pipeline.
//!
//! This module provides the preprocessing stages that turn a raw image
//! payload into the model input tensor: payload decoding with input-bound
//! checks, Dull-Razor hair artifact removal, and resizing with intensity
//! scaling.
//!
//! # Modules
//!
//! * `decode` - Payload decoding and input-bound checks
//! * `hair_removal` - Dull-Razor hair artifact detection and inpainting
//! * `normalize` - Resizing and intensity scaling into the input tensor

mod decode;
mod hair_removal;
mod normalize;

pub use decode::ImageDecoder;
pub use hair_removal::HairRemover;
pub use normalize::InputNormalizer;

use crate::core::config::PreprocessConfig;
use crate::core::errors::DiagResult;
use crate::core::tensor::ImageTensor;
use tracing::debug;

/// Full preprocessing pipeline from raw payload to model input tensor.
///
/// Composes the decode, hair removal, and normalization stages. Hair
/// removal can be disabled through [`PreprocessConfig::hair_removal`], in
/// which case the decoded image goes straight to normalization.
#[derive(Debug, Clone)]
pub struct DullRazorPreprocessor {
    decoder: ImageDecoder,
    hair_remover: HairRemover,
    normalizer: InputNormalizer,
    hair_removal: bool,
}

impl DullRazorPreprocessor {
    /// Creates a preprocessor from the preprocessing configuration.
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            decoder: ImageDecoder::new(config),
            hair_remover: HairRemover::new(config),
            normalizer: InputNormalizer::new(),
            hair_removal: config.hair_removal,
        }
    }

    /// Turns a raw JPEG/PNG payload into the model input tensor.
    ///
    /// The result is a pure function of the payload bytes: the same bytes
    /// always produce the same tensor.
    ///
    /// # Errors
    ///
    /// Propagates `Decode` and `Validation` errors from the decode stage
    /// and internal `Processing` errors from the later stages.
    pub fn preprocess(&self, bytes: &[u8]) -> DiagResult<ImageTensor> {
        let image = self.decoder.decode(bytes)?;
        let image = if self.hair_removal {
            self.hair_remover.remove(&image)?
        } else {
            debug!("hair removal disabled, skipping");
            image
        };
        self.normalizer.normalize(&image)
    }
}

impl Default for DullRazorPreprocessor {
    fn default() -> Self {
        Self::new(&PreprocessConfig::default())
    }
}
