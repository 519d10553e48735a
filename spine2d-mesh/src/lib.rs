//! Mesh batching for Spine skeletons (unofficial).
//!
//! Turns the per-attachment geometry computed by a Spine runtime into a few shared vertex/index
//! buffers, split into material groups so each group is one GPU draw call. This crate is
//! renderer-agnostic. Rendering integrations live in separate crates (e.g. `spine2d-mesh-wgpu`).

#![forbid(unsafe_code)]

mod batcher;
mod bounds;
mod config;
mod debug;
mod error;
mod material;
mod mesh;
mod model;
mod node;
mod skeleton_mesh;
mod texture;

pub use batcher::*;
pub use bounds::*;
pub use config::*;
pub use debug::*;
pub use error::*;
pub use material::{Material, MaterialGroup, MaterialId};
pub use mesh::*;
pub use model::{BlendMode, MaterialKey, TextureId, Vertex, VertexLayout};
pub use node::*;
pub use skeleton_mesh::*;
pub use texture::*;


#[cfg(test)]
mod skeleton_mesh_tests;



#[cfg(test)]
mod texture_tests;

#[cfg(all(test, feature = "json"))]
mod config_tests;
