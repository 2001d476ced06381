use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the viewer library.
///
/// Nothing here is fatal to the process: the binary decides at its boundary
/// whether an error aborts the current operation or is logged and degraded
/// to an empty state (see [`crate::config::FailurePolicy`]).
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("shader linking failed: {0}")]
    ShaderLink(String),

    #[error("scene import failed for {path}: {reason}")]
    SceneImport { path: PathBuf, reason: String },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gpu resource error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
