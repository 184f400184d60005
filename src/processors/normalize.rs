//! Resizing and intensity scaling into the model input tensor.

use crate::core::constants::{MODEL_INPUT_CHANNELS, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH};
use crate::core::errors::DiagResult;
use crate::core::tensor::{validate_model_input, ImageTensor};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array3;

/// Converts a cleaned image into the fixed-size `[0,1]` input tensor.
///
/// The image is stretched to the model's input size with Lanczos3
/// resampling, then each channel is scaled from `[0,255]` to `[0,1]` in
/// height, width, channel order.
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer;

impl InputNormalizer {
    /// Creates a normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Produces the model input tensor for an image.
    ///
    /// # Errors
    ///
    /// Returns an internal `Processing` error when the produced tensor does
    /// not match the model input shape.
    pub fn normalize(&self, image: &DynamicImage) -> DiagResult<ImageTensor> {
        let resized = image.resize_exact(MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT, FilterType::Lanczos3);
        let rgb = resized.to_rgb8();

        let mut tensor = Array3::<f32>::zeros((
            MODEL_INPUT_HEIGHT as usize,
            MODEL_INPUT_WIDTH as usize,
            MODEL_INPUT_CHANNELS,
        ));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let (row, col) = (y as usize, x as usize);
            tensor[[row, col, 0]] = f32::from(pixel[0]) / 255.0;
            tensor[[row, col, 1]] = f32::from(pixel[1]) / 255.0;
            tensor[[row, col, 2]] = f32::from(pixel[2]) / 255.0;
        }

        validate_model_input(&tensor)?;
        Ok(tensor)
    }
}
