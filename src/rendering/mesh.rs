use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use glow::HasContext;

use crate::asset::loader::MeshData;
use crate::asset::material::TextureKind;
use crate::error::{Result, ViewerError};
use crate::rendering::shader::{ShaderProgram, UniformValue};
use crate::rendering::texture::Texture;

/// GPU vertex layout: attribute slots 0/1/2, 32-byte stride, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// One mesh's GPU residence: vertex buffer, index buffer, and layout object,
/// allocated at construction and uploaded once (static usage, no update
/// path). The buffers are released when the mesh is dropped.
pub struct Mesh {
    gl: Arc<glow::Context>,
    data: MeshData,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
}

impl Mesh {
    pub fn new(gl: Arc<glow::Context>, data: MeshData) -> Result<Self> {
        let (vao, vbo, ebo) = unsafe {
            let vao = gl.create_vertex_array().map_err(ViewerError::Gpu)?;
            let vbo = gl.create_buffer().map_err(ViewerError::Gpu)?;
            let ebo = gl.create_buffer().map_err(ViewerError::Gpu)?;

            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&data.vertices),
                glow::STATIC_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&data.indices),
                glow::STATIC_DRAW,
            );

            let stride = std::mem::size_of::<Vertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                (3 * std::mem::size_of::<f32>()) as i32,
            );
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                (6 * std::mem::size_of::<f32>()) as i32,
            );

            gl.bind_vertex_array(None);
            (vao, vbo, ebo)
        };

        Ok(Self {
            gl,
            data,
            vao,
            vbo,
            ebo,
        })
    }

    /// Draws the mesh through `program`, resolving texture references
    /// against the owning model's shared texture list.
    ///
    /// Texture units are assigned sequentially from 0 in reference order;
    /// the sampler array index counts diffuse and specular references
    /// independently, both restarting at 0 for every draw call.
    pub fn draw(&self, program: &mut ShaderProgram, textures: &[Texture]) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
        }
        program.activate();

        if let Some(material) = &self.data.material {
            program.set_uniform("material.kd", UniformValue::Vec3(Vec3::from(material.diffuse)));
            program.set_uniform("material.ks", UniformValue::Vec3(Vec3::from(material.specular)));
            program.set_uniform("material.ka", UniformValue::Vec3(Vec3::from(material.ambient)));
            program.set_uniform("material.shininess", UniformValue::Float(material.shininess));
        }

        let mut diffuse_count = 0u32;
        let mut specular_count = 0u32;
        for (unit, texture_ref) in self.data.texture_refs.iter().enumerate() {
            let Some(texture) = textures.get(texture_ref.index) else {
                continue;
            };
            let name = match texture_ref.kind {
                TextureKind::Diffuse => {
                    let name = format!("diffuseTextures[{}]", diffuse_count);
                    diffuse_count += 1;
                    name
                }
                TextureKind::Specular => {
                    let name = format!("specularTextures[{}]", specular_count);
                    specular_count += 1;
                    name
                }
            };
            program.set_uniform_texture(&name, texture.raw(), unit as u32);
        }
        program.set_uniform(
            "hasDiffuseTextures",
            UniformValue::Bool(diffuse_count > 0),
        );
        program.set_uniform(
            "hasSpecularTextures",
            UniformValue::Bool(specular_count > 0),
        );

        unsafe {
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.data.indices.len() as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }

        program.deactivate();
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_declared_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn vertices_cast_to_bytes_without_padding() {
        let vertices = [
            Vertex {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 1.0, 0.0],
                texcoord: [0.5, 0.5],
            };
            3
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 3 * 32);
    }
}
