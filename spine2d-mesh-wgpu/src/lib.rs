//! wgpu integration for `spine2d-mesh`.
//!
//! [`MeshRenderer`] owns the pipelines; [`GpuMesh`] / [`GpuSkeleton`] hold the per-mesh buffers.
//! Each material group of a batched mesh becomes one `draw_indexed` call.

#![forbid(unsafe_code)]

mod renderer;

pub use renderer::*;
