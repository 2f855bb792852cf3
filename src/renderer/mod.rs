//! Rendering module
//!
//! `scene` turns game state into a pixel-space triangle list; `pipeline`
//! uploads it through WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
