use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use glow::HasContext;

use crate::error::{Result, ViewerError};

/// Binding point shared by every program that declares the camera block.
pub const CAMERA_BLOCK_BINDING: u32 = 0;
pub const CAMERA_BLOCK_NAME: &str = "CameraBlock";

/// std140 image of the block: view then projection, 128 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CameraBlockData {
    view: [f32; 16],
    projection: [f32; 16],
}

/// The persistent GPU mirror of the camera transforms.
///
/// One instance per renderer, allocated once and bound to its slot for the
/// renderer's whole life; [`CameraBuffer::upload`] rewrites the contents
/// whenever the camera changes.
pub struct CameraBuffer {
    gl: Arc<glow::Context>,
    ubo: glow::Buffer,
}

impl CameraBuffer {
    pub fn new(gl: Arc<glow::Context>) -> Result<Self> {
        let ubo = unsafe {
            let ubo = gl.create_buffer().map_err(ViewerError::Gpu)?;
            gl.bind_buffer(glow::UNIFORM_BUFFER, Some(ubo));
            gl.buffer_data_size(
                glow::UNIFORM_BUFFER,
                std::mem::size_of::<CameraBlockData>() as i32,
                glow::DYNAMIC_DRAW,
            );
            gl.bind_buffer_base(glow::UNIFORM_BUFFER, CAMERA_BLOCK_BINDING, Some(ubo));
            gl.bind_buffer(glow::UNIFORM_BUFFER, None);
            ubo
        };

        Ok(Self { gl, ubo })
    }

    pub fn upload(&self, view: Mat4, projection: Mat4) {
        let data = CameraBlockData {
            view: view.to_cols_array(),
            projection: projection.to_cols_array(),
        };
        unsafe {
            self.gl.bind_buffer(glow::UNIFORM_BUFFER, Some(self.ubo));
            self.gl
                .buffer_sub_data_u8_slice(glow::UNIFORM_BUFFER, 0, bytemuck::bytes_of(&data));
            self.gl.bind_buffer(glow::UNIFORM_BUFFER, None);
        }
    }
}

impl Drop for CameraBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.ubo);
        }
    }
}
