pub mod asset;
pub mod config;
pub mod error;
pub mod rendering;

// Re-export commonly used types
pub use asset::loader::{LoadOptions, MeshData, ModelData, TextureSource};
pub use asset::material::{Material, TextureKind, TextureRef};
pub use config::{FailurePolicy, ViewerConfig};
pub use error::ViewerError;
pub use rendering::camera::{Camera, CameraMovement};
pub use rendering::mesh::Vertex;
pub use rendering::renderer::{RenderMode, Renderer};
pub use rendering::shader::{ShaderProgram, UniformValue};
