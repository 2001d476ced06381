use std::path::Path;
use std::sync::Arc;

use glow::HasContext;

use crate::asset::loader::TextureSource;
use crate::asset::material::TextureKind;
use crate::error::{Result, ViewerError};

/// A GPU texture, nearest-filtered, identified by its source path.
///
/// A source whose pixels failed to decode still gets a texture object so
/// index-based references stay valid; its storage is simply never written
/// and samples as undefined content.
pub struct Texture {
    gl: Arc<glow::Context>,
    raw: glow::Texture,
    path: std::path::PathBuf,
    kind: TextureKind,
}

impl Texture {
    pub fn from_source(gl: Arc<glow::Context>, source: &TextureSource) -> Result<Self> {
        let raw = unsafe {
            let raw = gl.create_texture().map_err(ViewerError::Gpu)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );

            if let Some(pixels) = &source.pixels {
                gl.tex_image_2d(
                    glow::TEXTURE_2D,
                    0,
                    glow::RGBA8 as i32,
                    pixels.width() as i32,
                    pixels.height() as i32,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    Some(pixels.as_raw()),
                );
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            raw
        };

        Ok(Self {
            gl,
            raw,
            path: source.path.clone(),
            kind: source.kind,
        })
    }

    pub fn raw(&self) -> glow::Texture {
        self.raw
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.raw);
        }
    }
}
