//! Scene import and CPU-side model assembly.
pub mod gltf;
pub mod loader;
pub mod material;
pub mod obj;
pub mod scene;

// Public interface
pub use loader::{LoadOptions, MeshData, ModelData, TextureSource};
pub use material::{Material, TextureKind, TextureRef};
pub use scene::{SceneGraph, SceneMaterial, SceneNode, SubMesh, TextureSlot};
