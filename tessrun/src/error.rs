use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TessError {
    #[error("Input image not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR engine not found or not executable: {binary}")]
    EngineNotFound { binary: String },

    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("OCR engine did not produce {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("OCR engine output is not valid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("Invalid config override '{0}', expected key=value")]
    InvalidOverride(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR task panicked: {0}")]
    Task(String),
}

impl TessError {
    /// Failures that happen before the engine gets to look at the image.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            TessError::InputNotFound(_) | TessError::Image(_) | TessError::EngineNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TessError>;
