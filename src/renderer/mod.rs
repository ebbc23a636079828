//! WebGPU rendering module
//!
//! The scene is rebuilt as a flat-colored triangle list every frame.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, Viewport};
pub use scene::{build_scene, current_aim};
pub use vertex::Vertex;
