//! Tensor aliases and shape helpers for model input.

use crate::core::constants::{MODEL_INPUT_CHANNELS, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH};
use crate::core::errors::{DiagResult, DiagnosisError, PipelineStage};
use ndarray::{Array3, Array4, Axis};

/// A preprocessed image in HWC order with intensities scaled to [0, 1].
pub type ImageTensor = Array3<f32>;

/// A batch of preprocessed images in NHWC order.
pub type BatchTensor = Array4<f32>;

/// Checks that a tensor matches the model input shape.
///
/// A mismatch here is an internal fault: the preprocessor guarantees the
/// shape, so anything else means a stage upstream misbehaved.
pub fn validate_model_input(tensor: &ImageTensor) -> DiagResult<()> {
    let expected = (
        MODEL_INPUT_HEIGHT as usize,
        MODEL_INPUT_WIDTH as usize,
        MODEL_INPUT_CHANNELS,
    );
    let actual = tensor.dim();
    if actual != expected {
        return Err(DiagnosisError::internal(
            PipelineStage::TensorLayout,
            format!("model input shape mismatch: expected {expected:?}, got {actual:?}"),
        ));
    }
    Ok(())
}

/// Promotes a single image tensor to a batch of one in NHWC order.
pub fn to_batch(tensor: &ImageTensor) -> BatchTensor {
    tensor.view().insert_axis(Axis(0)).to_owned()
}
