use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glow::HasContext;

use crate::error::{Result, ViewerError};

/// The closed set of values a shading program accepts through
/// [`ShaderProgram::set_uniform`].
#[derive(Debug, Clone, Copy)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(glam::Vec2),
    Vec3(glam::Vec3),
    Mat4(glam::Mat4),
}

/// A compiled-and-linked vertex/fragment pair.
///
/// Uniform lookups are cached per program. A name the driver does not expose
/// (misspelled, or optimized out) is cached as absent and every set through
/// it is silently inert — programs only declare the uniforms they read.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    program: glow::Program,
    uniforms: HashMap<String, Option<glow::UniformLocation>>,
}

impl ShaderProgram {
    pub fn from_source(
        gl: Arc<glow::Context>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self> {
        let vertex_shader = compile_shader(&gl, vertex_source, glow::VERTEX_SHADER)?;
        let fragment_shader = compile_shader(&gl, fragment_source, glow::FRAGMENT_SHADER);
        let fragment_shader = match fragment_shader {
            Ok(shader) => shader,
            Err(e) => {
                unsafe { gl.delete_shader(vertex_shader) };
                return Err(e);
            }
        };

        let program = unsafe {
            let program = gl.create_program().map_err(ViewerError::Gpu)?;
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            if !gl.get_program_link_status(program) {
                let info_log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ViewerError::ShaderLink(info_log));
            }
            program
        };

        Ok(Self {
            gl,
            program,
            uniforms: HashMap::new(),
        })
    }

    /// Reads a vertex/fragment source pair from disk and compiles it.
    pub fn from_files(
        gl: Arc<glow::Context>,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self> {
        let vertex_source = std::fs::read_to_string(vertex_path)?;
        let fragment_source = std::fs::read_to_string(fragment_path)?;
        Self::from_source(gl, &vertex_source, &fragment_source)
    }

    pub fn activate(&self) {
        unsafe {
            self.gl.use_program(Some(self.program));
        }
    }

    pub fn deactivate(&self) {
        unsafe {
            self.gl.use_program(None);
        }
    }

    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.activate();
        let Some(location) = self.uniform_location(name) else {
            return;
        };
        unsafe {
            match value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(Some(&location), i32::from(v)),
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&location), v),
                UniformValue::UInt(v) => self.gl.uniform_1_u32(Some(&location), v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(Some(&location), v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(Some(&location), v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(Some(&location), v.x, v.y, v.z),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(Some(&location), false, &m.to_cols_array())
                }
            }
        }
    }

    /// Binds `texture` to the given unit and points the named sampler at it.
    pub fn set_uniform_texture(&mut self, name: &str, texture: glow::Texture, unit: u32) {
        self.activate();
        let location = self.uniform_location(name);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            if let Some(location) = location {
                self.gl.uniform_1_i32(Some(&location), unit as i32);
            }
        }
    }

    /// Wires a named uniform block to a global binding point. Programs that
    /// do not declare the block are left alone.
    pub fn set_uniform_block_binding(&self, block_name: &str, binding: u32) {
        unsafe {
            match self.gl.get_uniform_block_index(self.program, block_name) {
                Some(index) => self.gl.uniform_block_binding(self.program, index, binding),
                None => log::debug!("uniform block '{}' not declared in program", block_name),
            }
        }
    }

    fn uniform_location(&mut self, name: &str) -> Option<glow::UniformLocation> {
        if let Some(cached) = self.uniforms.get(name) {
            return cached.clone();
        }

        let location = unsafe { self.gl.get_uniform_location(self.program, name) };
        if location.is_none() {
            log::debug!("uniform '{}' not found in program", name);
        }
        self.uniforms.insert(name.to_string(), location.clone());
        location
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.program);
        }
    }
}

fn compile_shader(gl: &glow::Context, source: &str, stage: u32) -> Result<glow::Shader> {
    unsafe {
        let shader = gl.create_shader(stage).map_err(ViewerError::Gpu)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let info_log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ViewerError::ShaderCompile(info_log));
        }
        Ok(shader)
    }
}
