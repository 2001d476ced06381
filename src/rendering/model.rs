use std::sync::Arc;

use crate::asset::loader::ModelData;
use crate::error::Result;
use crate::rendering::mesh::Mesh;
use crate::rendering::shader::ShaderProgram;
use crate::rendering::texture::Texture;

/// A loaded model's GPU residence: its meshes plus the shared texture list
/// they reference by index. Dropping the model releases every GPU object it
/// owns, exactly once.
pub struct Model {
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
}

impl Model {
    /// Uploads CPU-side model data. Textures first, so meshes can never
    /// outlive references into a partially built list.
    pub fn upload(gl: &Arc<glow::Context>, data: ModelData) -> Result<Self> {
        let ModelData { meshes, textures } = data;

        let textures = textures
            .iter()
            .map(|source| Texture::from_source(gl.clone(), source))
            .collect::<Result<Vec<_>>>()?;

        let meshes = meshes
            .into_iter()
            .map(|mesh| Mesh::new(gl.clone(), mesh))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { meshes, textures })
    }

    pub fn draw(&self, program: &mut ShaderProgram) {
        for mesh in &self.meshes {
            mesh.draw(program, &self.textures);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.data().vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.data().triangle_count()).sum()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
