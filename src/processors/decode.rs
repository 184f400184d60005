//! Image payload decoding and input-bound checks.

use crate::core::config::PreprocessConfig;
use crate::core::constants::{CORRUPT_IMAGE_DIMENSION, MIN_IMAGE_DIMENSION};
use crate::core::errors::{DiagResult, DiagnosisError};
use image::DynamicImage;
use tracing::debug;

/// Decodes raw JPEG/PNG payloads and enforces the accepted input bounds.
///
/// The size and resolution floors exist so obviously unusable uploads are
/// rejected with a caller-correctable error before any pixel work happens.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_image_bytes: usize,
}

impl ImageDecoder {
    /// Creates a decoder from the preprocessing configuration.
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            max_image_bytes: config.max_image_bytes,
        }
    }

    /// Decodes the payload into an image.
    ///
    /// # Errors
    ///
    /// Returns `Decode` when the payload is empty or not a readable image,
    /// and `Validation` when it exceeds the byte budget, sits below the
    /// 50x50 plausibility floor (reported as corrupted), or sits below the
    /// 100x100 minimum resolution.
    pub fn decode(&self, bytes: &[u8]) -> DiagResult<DynamicImage> {
        if bytes.is_empty() {
            return Err(DiagnosisError::decode_message("empty image payload"));
        }

        if bytes.len() > self.max_image_bytes {
            return Err(DiagnosisError::validation(format!(
                "file too large: {} bytes, maximum size: {} bytes",
                bytes.len(),
                self.max_image_bytes
            )));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|source| DiagnosisError::decode("invalid or corrupted image file", source))?;

        let (width, height) = (image.width(), image.height());
        if width < CORRUPT_IMAGE_DIMENSION || height < CORRUPT_IMAGE_DIMENSION {
            return Err(DiagnosisError::validation(format!(
                "image appears corrupted: {width}x{height} pixels is below the \
                 {CORRUPT_IMAGE_DIMENSION}x{CORRUPT_IMAGE_DIMENSION} plausibility floor"
            )));
        }
        if width < MIN_IMAGE_DIMENSION || height < MIN_IMAGE_DIMENSION {
            return Err(DiagnosisError::validation(format!(
                "image resolution too low: {width}x{height} pixels, minimum required: \
                 {MIN_IMAGE_DIMENSION}x{MIN_IMAGE_DIMENSION} pixels"
            )));
        }

        debug!(width, height, "decoded image payload");
        Ok(image)
    }
}
