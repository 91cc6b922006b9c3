//! Backend type aliases and device management
//!
//! Convenient type aliases for the Burn backends used in training and
//! inference, plus a helper for device selection.
//!
//! # Backend Selection
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend for training (CPU)
//! - **InferenceBackend**: Plain NdArray backend for inference (CPU)
//!
//! The NdArray backend is sufficient here: the observation is a 3-element
//! vector and the network is a small MLP, so CPU training is fast. GPU support
//! (via the Wgpu backend) could be added later for larger-scale experiments.

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend type for training (with autodiff)
///
/// Includes automatic differentiation support needed for gradient-based
/// optimization.
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for inference (without autodiff)
///
/// Used for running trained models; does not track gradients.
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
///
/// Returns the default NdArray device (CPU). Safe to call multiple times.
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device() {
        let device = default_device();
        let _device_copy = device.clone();
    }

    #[test]
    fn test_multiple_device_calls() {
        let device1 = default_device();
        let device2 = default_device();
        assert_eq!(
            std::mem::discriminant(&device1),
            std::mem::discriminant(&device2)
        );
    }
}
