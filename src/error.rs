//! Error types for the scene exporter.

use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for scene export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to parse a JSON scene description.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The render backend failed to produce a readback.
    #[error("Render error: {0}")]
    Render(String),

    /// Failed to serialize a mesh to the interchange format.
    #[error("Mesh export error: {0}")]
    MeshExport(String),

    /// Failed to encode a texture to a byte stream.
    #[error("Texture encode error: {0}")]
    TextureEncode(String),
}
