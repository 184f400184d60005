//! Dull-Razor hair artifact removal.
//!
//! Dermoscopic photographs often contain hair strands crossing the lesion.
//! Left in place they read as dark elongated structures and bias the
//! classifier. This stage estimates a hair-free background with a grayscale
//! morphological closing, thresholds the closing residual into a hair mask,
//! and inpaints masked pixels from their unmasked neighborhood so lesion
//! texture is preserved.

use crate::core::config::PreprocessConfig;
use crate::core::constants::{MAX_HAIR_KERNEL_RADIUS, MAX_INPAINT_RADIUS};
use crate::core::errors::{DiagResult, DiagnosisError, PipelineStage};
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use tracing::debug;

/// Removes hair-like artifacts from a lesion photograph.
#[derive(Debug, Clone)]
pub struct HairRemover {
    residual_threshold: u8,
}

impl HairRemover {
    /// Creates a remover from the preprocessing configuration.
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            residual_threshold: config.hair_residual_threshold,
        }
    }

    /// Structuring element radius for an image of the given size.
    ///
    /// Hair strands occupy a roughly constant fraction of the frame across
    /// capture devices, so the radius scales with the short side and is
    /// clamped to a workable range.
    fn kernel_radius(width: u32, height: u32) -> u8 {
        (width.min(height) / 128).clamp(1, u32::from(MAX_HAIR_KERNEL_RADIUS)) as u8
    }

    /// Detects hair pixels and inpaints them.
    ///
    /// Pixels whose grayscale closing residual exceeds the configured
    /// threshold are treated as hair. The mask is dilated by one pixel to
    /// cover strand borders, then every masked pixel is replaced by the mean
    /// of unmasked pixels from the smallest surrounding window that contains
    /// any. Donor pixels always come from the original image, never from
    /// already inpainted ones. A masked pixel with no donor in range keeps
    /// its original value.
    ///
    /// # Errors
    ///
    /// Returns an internal `Processing` error when the morphology output
    /// does not match the input dimensions.
    pub fn remove(&self, image: &DynamicImage) -> DiagResult<DynamicImage> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let radius = Self::kernel_radius(width, height);

        let closed = morphology::grayscale_close(&gray, &morphology::Mask::square(radius));
        if closed.dimensions() != (width, height) {
            return Err(DiagnosisError::internal(
                PipelineStage::HairRemoval,
                format!(
                    "morphological closing changed dimensions from {width}x{height} to {}x{}",
                    closed.width(),
                    closed.height()
                ),
            ));
        }

        let mut mask = GrayImage::new(width, height);
        let mut hair_pixels = 0usize;
        for (x, y, pixel) in mask.enumerate_pixels_mut() {
            let residual = closed.get_pixel(x, y)[0].saturating_sub(gray.get_pixel(x, y)[0]);
            if residual > self.residual_threshold {
                *pixel = Luma([255]);
                hair_pixels += 1;
            }
        }

        if hair_pixels == 0 {
            debug!(radius, "no hair artifacts detected");
            return Ok(image.clone());
        }

        let mask = morphology::dilate(&mask, Norm::LInf, 1);
        let source = image.to_rgb8();
        let mut output = source.clone();

        let mut inpainted = 0usize;
        for y in 0..height {
            for x in 0..width {
                if mask.get_pixel(x, y)[0] == 0 {
                    continue;
                }
                if let Some(replacement) = Self::neighborhood_mean(&source, &mask, x, y) {
                    output.put_pixel(x, y, replacement);
                    inpainted += 1;
                }
            }
        }

        debug!(radius, hair_pixels, inpainted, "hair artifacts inpainted");
        Ok(DynamicImage::ImageRgb8(output))
    }

    /// Mean color of unmasked pixels in the smallest window around
    /// `(x, y)` that contains any, or `None` when every pixel within the
    /// search cap is masked.
    fn neighborhood_mean(
        source: &RgbImage,
        mask: &GrayImage,
        x: u32,
        y: u32,
    ) -> Option<image::Rgb<u8>> {
        let (width, height) = source.dimensions();
        let mut window = 2u32;
        while window <= MAX_INPAINT_RADIUS {
            let x_min = x.saturating_sub(window);
            let y_min = y.saturating_sub(window);
            let x_max = (x + window).min(width - 1);
            let y_max = (y + window).min(height - 1);

            let mut sums = [0.0f64; 3];
            let mut donors = 0u32;
            for ny in y_min..=y_max {
                for nx in x_min..=x_max {
                    if mask.get_pixel(nx, ny)[0] != 0 {
                        continue;
                    }
                    let pixel = source.get_pixel(nx, ny);
                    sums[0] += f64::from(pixel[0]);
                    sums[1] += f64::from(pixel[1]);
                    sums[2] += f64::from(pixel[2]);
                    donors += 1;
                }
            }

            if donors > 0 {
                let n = f64::from(donors);
                return Some(image::Rgb([
                    (sums[0] / n).round() as u8,
                    (sums[1] / n).round() as u8,
                    (sums[2] / n).round() as u8,
                ]));
            }
            window *= 2;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn remover() -> HairRemover {
        HairRemover::new(&PreprocessConfig::default())
    }

    fn image_with_vertical_hair(background: u8, hair: u8) -> DynamicImage {
        let mut image = RgbImage::from_pixel(200, 200, Rgb([background; 3]));
        for y in 0..200 {
            image.put_pixel(100, y, Rgb([hair; 3]));
        }
        DynamicImage::ImageRgb8(image)
    }

    #[test]
    fn kernel_radius_scales_with_the_short_side() {
        assert_eq!(HairRemover::kernel_radius(100, 100), 1);
        assert_eq!(HairRemover::kernel_radius(1024, 768), 6);
        assert_eq!(HairRemover::kernel_radius(4000, 3000), 7);
    }

    #[test]
    fn dark_strand_is_brightened_toward_the_background() {
        let cleaned = remover()
            .remove(&image_with_vertical_hair(200, 30))
            .unwrap()
            .to_rgb8();
        for y in [0, 50, 100, 199] {
            let pixel = cleaned.get_pixel(100, y);
            assert!(
                pixel[0] > 150,
                "strand pixel at y={y} still dark: {}",
                pixel[0]
            );
        }
    }

    #[test]
    fn pixels_away_from_the_strand_are_untouched() {
        let cleaned = remover()
            .remove(&image_with_vertical_hair(200, 30))
            .unwrap()
            .to_rgb8();
        for x in [0, 50, 150, 199] {
            assert_eq!(cleaned.get_pixel(x, 100), &Rgb([200, 200, 200]));
        }
    }

    #[test]
    fn uniform_image_passes_through_unchanged() {
        let original = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 120, Rgb([90, 60, 50])));
        let cleaned = remover().remove(&original).unwrap();
        assert_eq!(cleaned.to_rgb8(), original.to_rgb8());
    }

    #[test]
    fn output_is_deterministic() {
        let image = image_with_vertical_hair(180, 40);
        let first = remover().remove(&image).unwrap().to_rgb8();
        let second = remover().remove(&image).unwrap().to_rgb8();
        assert_eq!(first, second);
    }
}
