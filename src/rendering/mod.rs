//! GPU-side resources and the per-frame draw orchestration.
pub mod camera;
pub mod camera_buffer;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod shader;
pub mod shaders;
pub mod texture;

// Public interface
pub use camera::{Camera, CameraMovement, FAR_PLANE, NEAR_PLANE};
pub use camera_buffer::{CameraBuffer, CAMERA_BLOCK_BINDING, CAMERA_BLOCK_NAME};
pub use mesh::{Mesh, Vertex};
pub use model::Model;
pub use renderer::{ModelStats, RenderMode, Renderer};
pub use shader::{ShaderProgram, UniformValue};
pub use texture::Texture;
