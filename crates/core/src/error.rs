//! Error types for lecture-note conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a lecture document.
///
/// Structural extraction never produces these; only setup and output
/// stages do.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input document does not exist.
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A required external program is not available.
    #[error("Missing required external capability: {0}")]
    MissingCapability(String),

    /// A single equation could not be rendered.
    #[error("Equation rendering failed: {0}")]
    RenderError(String),

    /// Failed to assemble the PPTX package.
    #[error("PPTX writing error: {0}")]
    PptxWriteError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Notebook JSON could not be processed.
    #[error("Notebook error: {0}")]
    NotebookError(String),
}
