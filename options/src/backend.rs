//! Backend and compute-device selection.
//!
//! The tensor backend is fixed at compile time through feature flags. The
//! device is chosen at run time from the first requested GPU id and returned
//! to the caller instead of being installed as process-wide state.

use std::panic::{self, AssertUnwindSafe};

use burn::tensor::Tensor;
use cfg_if::cfg_if;

use crate::error::{OptionsError, OptionsResult};

cfg_if! {
    if #[cfg(feature = "cuda")] {
        use burn::backend::cuda::{Cuda, CudaDevice};

        /// Selected backend type
        pub type SelectedBackend = Cuda;
        /// Selected device type
        pub type SelectedDevice = CudaDevice;

        fn gpu_device(id: usize) -> Option<SelectedDevice> {
            Some(CudaDevice::new(id))
        }

        /// Gets the backend name for logging purposes
        pub const fn get_backend_name() -> &'static str {
            "CUDA (NVIDIA GPU)"
        }
    } else if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        /// Selected backend type
        pub type SelectedBackend = Wgpu;
        /// Selected device type
        pub type SelectedDevice = WgpuDevice;

        fn gpu_device(id: usize) -> Option<SelectedDevice> {
            Some(WgpuDevice::DiscreteGpu(id))
        }

        /// Gets the backend name for logging purposes
        pub const fn get_backend_name() -> &'static str {
            "WGPU (GPU)"
        }
    } else {
        // Default to ndarray backend
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        /// Selected backend type
        pub type SelectedBackend = NdArray;
        /// Selected device type
        pub type SelectedDevice = NdArrayDevice;

        // The CPU backend exposes no GPUs.
        fn gpu_device(_id: usize) -> Option<SelectedDevice> {
            None
        }

        /// Gets the backend name for logging purposes
        pub const fn get_backend_name() -> &'static str {
            "NdArray (CPU)"
        }
    }
}

/// Turns a GPU id into a usable compute device.
pub trait DeviceSelector {
    /// The device handle handed to the pipeline.
    type Device: Clone + std::fmt::Debug;

    /// Selects device `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::DeviceUnavailable`] if `id` does not name an
    /// available device.
    fn select(&self, id: usize) -> OptionsResult<Self::Device>;
}

/// Device selector for the backend compiled into this build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSelector;

impl DeviceSelector for BackendSelector {
    type Device = SelectedDevice;

    fn select(&self, id: usize) -> OptionsResult<SelectedDevice> {
        let device = gpu_device(id).ok_or_else(|| OptionsError::DeviceUnavailable {
            id,
            reason: format!("the {} backend has no GPU devices", get_backend_name()),
        })?;
        probe(&device).map_err(|reason| OptionsError::DeviceUnavailable { id, reason })?;
        Ok(device)
    }
}

/// Materializes a one-element tensor on `device`.
///
/// GPU runtimes panic when a device index does not exist, so the panic is
/// caught and reported as the reason.
fn probe(device: &SelectedDevice) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        Tensor::<SelectedBackend, 1>::zeros([1], device).into_data();
    }))
    .map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "device initialization panicked".to_string())
    })
}

#[cfg(all(test, not(any(feature = "cuda", feature = "wgpu"))))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn cpu_backend_rejects_gpu_ids() {
        let err = BackendSelector.select(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Device);
        assert!(err.to_string().contains("GPU 0"));
    }

    #[test]
    fn cpu_device_probes_cleanly() {
        assert!(probe(&SelectedDevice::default()).is_ok());
    }
}
