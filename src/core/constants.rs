//! Constants used throughout the diagnosis pipeline.
//!
//! This module defines the fixed parameters of the pipeline: the model input
//! geometry, input validation bounds, triage thresholds, and the tunables of
//! the Dull-Razor preprocessing stage.

/// The number of disease classes the classifier distinguishes.
pub const NUM_CLASSES: usize = 4;

/// The height of the model input in pixels.
pub const MODEL_INPUT_HEIGHT: u32 = 224;

/// The width of the model input in pixels.
pub const MODEL_INPUT_WIDTH: u32 = 224;

/// The number of color channels fed to the model.
pub const MODEL_INPUT_CHANNELS: usize = 3;

/// The minimum acceptable width and height for an input image.
///
/// Images below this resolution carry too little detail for the classifier
/// and are rejected before preprocessing.
pub const MIN_IMAGE_DIMENSION: u32 = 100;

/// The dimension below which an image is treated as corrupted.
///
/// A payload that decodes to less than this in either dimension is almost
/// certainly a truncated or damaged file rather than a small photograph,
/// and is rejected with corruption wording instead of a resolution hint.
pub const CORRUPT_IMAGE_DIMENSION: u32 = 50;

/// The default maximum accepted payload size in bytes (10 MiB).
///
/// The serving layer enforces this limit first; the preprocessor re-checks
/// it so the library holds the contract on its own.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// The default melanoma probability at or above which triage is CRITICAL.
pub const MELANOMA_CRITICAL_THRESHOLD: f32 = 0.50;

/// The default melanoma probability at or above which triage is HIGH.
pub const MELANOMA_HIGH_THRESHOLD: f32 = 0.30;

/// The default top-class confidence at or above which triage is MEDIUM.
pub const CONFIDENCE_MEDIUM_THRESHOLD: f32 = 0.70;

/// The default top-class confidence below which no diagnosis is asserted.
///
/// Below this floor the pipeline reports a low-confidence outcome instead
/// of naming a disease.
pub const LOW_CONFIDENCE_FLOOR: f32 = 0.30;

/// The tolerance when checking that a probability vector sums to one.
pub const SIMPLEX_TOLERANCE: f32 = 1e-6;

/// The default grayscale residual above which a pixel counts as hair.
///
/// The residual is the brightening a pixel receives under morphological
/// closing; dark hair strands brighten strongly, skin barely moves.
pub const DEFAULT_HAIR_RESIDUAL_THRESHOLD: u8 = 10;

/// The upper bound for the hair-closing structuring element radius.
pub const MAX_HAIR_KERNEL_RADIUS: u8 = 7;

/// The largest window radius searched when inpainting a hair pixel.
pub const MAX_INPAINT_RADIUS: u32 = 16;

/// The default threshold for parallel processing.
///
/// Batches larger than this are diagnosed through rayon; smaller batches
/// run sequentially to avoid the scheduling overhead.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// The architecture label reported in model info.
pub const MODEL_TYPE_LABEL: &str = "EfficientNetB0";

/// The input shape label reported in model info.
pub const MODEL_INPUT_SHAPE_LABEL: &str = "224x224x3";

/// The preprocessing label reported in model info.
pub const MODEL_PREPROCESSING_LABEL: &str = "Dull-Razor + Normalization";

/// The maximum accepted patient age in years.
pub const MAX_PATIENT_AGE: u32 = 150;
