use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the core scanning and extraction steps.
#[derive(Debug, Error)]
pub enum BarrelError {
    /// A configured root does not exist on disk.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Module text could not be parsed. Callers recover by treating the
    /// module as exporting nothing.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A filter or custom-extension handler could not be built from config.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Walk(#[from] ignore::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BarrelError>;
