//! GPU device and window surface.
//!
//! Opens the device, configures the swapchain, and hands out one encoder and
//! target view per frame.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};

#[cfg(test)]
pub(crate) use gpu::headless_device;
