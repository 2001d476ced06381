use std::path::PathBuf;

use image::RgbaImage;

/// Normalized product of the format-specific importers.
///
/// Importers flatten whatever their format calls a scene into this shape:
/// a node hierarchy that references sub-meshes by index, a flat sub-mesh
/// list, and a flat material list. Nothing in here has touched the GPU.
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub root: SceneNode,
    pub meshes: Vec<SubMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Decoded images are flipped vertically before upload when set.
    /// OBJ texture coordinates assume a bottom-left origin; glTF's already
    /// match GL sampling of top-down rows.
    pub flip_textures: bool,
}

#[derive(Debug, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub mesh_indices: Vec<usize>,
    pub children: Vec<SceneNode>,
}

/// One drawable primitive as the parser produced it.
///
/// `normals` and `texcoords` are empty when the source had none; the loader
/// zero-fills the corresponding vertex channels.
#[derive(Debug, Default)]
pub struct SubMesh {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Debug, Default)]
pub struct SceneMaterial {
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub ambient: [f32; 3],
    pub shininess: f32,
    pub diffuse_textures: Vec<TextureSlot>,
    pub specular_textures: Vec<TextureSlot>,
}

/// A texture referenced by a material, before cache resolution.
///
/// `key` is the dedup identity. For file-backed textures it is the path the
/// cache will decode; importers that decode images themselves (glTF) supply
/// `pixels` up front and the cache takes them as-is.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub key: PathBuf,
    pub pixels: Option<RgbaImage>,
}

impl TextureSlot {
    pub fn from_path(key: PathBuf) -> Self {
        Self { key, pixels: None }
    }

    pub fn with_pixels(key: PathBuf, pixels: RgbaImage) -> Self {
        Self {
            key,
            pixels: Some(pixels),
        }
    }
}
