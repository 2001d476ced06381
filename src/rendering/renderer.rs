use std::path::Path;
use std::sync::Arc;

use crate::asset::loader::{LoadOptions, ModelData};
use crate::config::{FailurePolicy, ViewerConfig};
use crate::error::Result;
use crate::rendering::camera::{Camera, CameraMovement};
use crate::rendering::camera_buffer::{CameraBuffer, CAMERA_BLOCK_BINDING, CAMERA_BLOCK_NAME};
use crate::rendering::model::Model;
use crate::rendering::shader::ShaderProgram;
use crate::rendering::shaders;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Position,
    Normal,
    TexCoords,
    UvTest,
    Shaded,
    Custom,
}

impl RenderMode {
    pub const ALL: [Self; 6] = [
        Self::Position,
        Self::Normal,
        Self::TexCoords,
        Self::UvTest,
        Self::Shaded,
        Self::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Normal => "Normal",
            Self::TexCoords => "TexCoords",
            Self::UvTest => "UV test",
            Self::Shaded => "Shaded",
            Self::Custom => "Custom",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "position" => Some(Self::Position),
            "normal" => Some(Self::Normal),
            "texcoords" => Some(Self::TexCoords),
            "uvtest" => Some(Self::UvTest),
            "shaded" => Some(Self::Shaded),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelStats {
    pub meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub textures: usize,
}

/// Owns the loaded model, the camera and its GPU transform block, and one
/// program per render mode. At most one model is live at a time; replacing
/// it releases the old one's GPU resources before the new upload starts.
pub struct Renderer {
    gl: Arc<glow::Context>,
    camera: Camera,
    camera_buffer: CameraBuffer,
    position_program: ShaderProgram,
    normal_program: ShaderProgram,
    texcoord_program: ShaderProgram,
    uvtest_program: ShaderProgram,
    shaded_program: ShaderProgram,
    custom_program: Option<ShaderProgram>,
    mode: RenderMode,
    model: Option<Model>,
    resolution: (u32, u32),
    failure_policy: FailurePolicy,
}

impl Renderer {
    pub fn new(gl: Arc<glow::Context>, config: &ViewerConfig) -> Result<Self> {
        let builtin = |fragment: &str| -> Result<ShaderProgram> {
            let program = ShaderProgram::from_source(gl.clone(), shaders::MODEL_VERTEX, fragment)?;
            program.set_uniform_block_binding(CAMERA_BLOCK_NAME, CAMERA_BLOCK_BINDING);
            Ok(program)
        };

        let position_program = builtin(shaders::POSITION_FRAGMENT)?;
        let normal_program = builtin(shaders::NORMAL_FRAGMENT)?;
        let texcoord_program = builtin(shaders::TEXCOORD_FRAGMENT)?;
        let uvtest_program = builtin(shaders::UVTEST_FRAGMENT)?;
        let shaded_program = builtin(shaders::PHONG_FRAGMENT)?;

        // A broken user shader is a diagnostic, not a startup failure.
        let custom_program = config.rendering.custom_shader.as_ref().and_then(|pair| {
            match ShaderProgram::from_files(gl.clone(), &pair.vertex, &pair.fragment) {
                Ok(program) => {
                    program.set_uniform_block_binding(CAMERA_BLOCK_NAME, CAMERA_BLOCK_BINDING);
                    Some(program)
                }
                Err(e) => {
                    log::error!("[renderer] custom shader not installed: {}", e);
                    None
                }
            }
        });

        let mode = RenderMode::from_config_name(&config.rendering.initial_mode).unwrap_or_else(|| {
            log::warn!(
                "[renderer] unknown render mode '{}', using shaded",
                config.rendering.initial_mode
            );
            RenderMode::Shaded
        });

        let camera = Camera::new(
            config.camera.fov,
            config.camera.movement_speed,
            config.camera.look_sensitivity,
        );
        let camera_buffer = CameraBuffer::new(gl.clone())?;

        let renderer = Self {
            gl,
            camera,
            camera_buffer,
            position_program,
            normal_program,
            texcoord_program,
            uvtest_program,
            shaded_program,
            custom_program,
            mode,
            model: None,
            resolution: (config.window.width.max(1), config.window.height.max(1)),
            failure_policy: config.assets.failure_policy,
        };
        renderer.push_camera_state();
        Ok(renderer)
    }

    /// Submits the current model through the program for the active mode.
    /// The camera block is already current: every mutation pushed it.
    pub fn render(&mut self) {
        let program = match self.mode {
            RenderMode::Position => Some(&mut self.position_program),
            RenderMode::Normal => Some(&mut self.normal_program),
            RenderMode::TexCoords => Some(&mut self.texcoord_program),
            RenderMode::UvTest => Some(&mut self.uvtest_program),
            RenderMode::Shaded => Some(&mut self.shaded_program),
            RenderMode::Custom => self.custom_program.as_mut(),
        };
        if let (Some(program), Some(model)) = (program, self.model.as_ref()) {
            model.draw(program);
        }
    }

    /// Replaces the owned model. The previous model's GPU resources are
    /// released before the new load begins, so at most one set of handles
    /// exists at any instant.
    pub fn load_model(&mut self, path: &Path) -> Result<()> {
        self.model = None;

        let options = LoadOptions {
            failure_policy: self.failure_policy,
        };
        let loaded = ModelData::load(path, &options)
            .and_then(|data| Model::upload(&self.gl, data));

        match loaded {
            Ok(model) => {
                self.model = Some(model);
                Ok(())
            }
            Err(e) => {
                if self.failure_policy == FailurePolicy::Strict {
                    return Err(e);
                }
                log::error!("[renderer] failed to load {}: {}", path.display(), e);
                Ok(())
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn model_stats(&self) -> ModelStats {
        match &self.model {
            Some(model) => ModelStats {
                meshes: model.mesh_count(),
                vertices: model.vertex_count(),
                triangles: model.triangle_count(),
                textures: model.texture_count(),
            },
            None => ModelStats::default(),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode == RenderMode::Custom && self.custom_program.is_none() {
            log::warn!("[renderer] no custom shader installed");
        }
        self.mode = mode;
    }

    pub fn has_custom_program(&self) -> bool {
        self.custom_program.is_some()
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = (width.max(1), height.max(1));
        self.push_camera_state();
    }

    pub fn camera_fov(&self) -> f32 {
        self.camera.fov
    }

    pub fn set_camera_fov(&mut self, fov: f32) {
        self.camera.fov = fov;
        self.push_camera_state();
    }

    pub fn camera_speed(&self) -> f32 {
        self.camera.movement_speed
    }

    pub fn set_camera_speed(&mut self, speed: f32) {
        self.camera.movement_speed = speed;
    }

    pub fn move_camera(&mut self, direction: CameraMovement, delta_time: f32) {
        self.camera.move_by(direction, delta_time);
        self.push_camera_state();
    }

    pub fn look_around_camera(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.camera.look_around(delta_yaw, delta_pitch);
        self.push_camera_state();
    }

    /// Rewrites the GPU block from the current camera state. Called inside
    /// every mutating operation, so draws in the same frame always read the
    /// matrices they were issued under.
    fn push_camera_state(&self) {
        let (width, height) = self.resolution;
        self.camera_buffer.upload(
            self.camera.view_matrix(),
            self.camera.projection_matrix(width, height),
        );
    }
}
