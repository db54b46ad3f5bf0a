//! Error types for canvas and export operations.

use thiserror::Error;

use crate::permission::Capability;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Result type for export pipeline stages.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while editing the drawing surface.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Background image pixels do not match the declared dimensions.
    #[error("Background image is {width}x{height} but carries {len} bytes")]
    BackgroundShape {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Actual byte length of the pixel data.
        len: usize,
    },

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    ResourceLoad(String),
}

/// Errors that abort a snapshot export.
///
/// Exactly one of these is produced for a failed export attempt. Only
/// [`ExportError::PermissionDenied`] is user-actionable; the rest are
/// reported to the user as a generic failure.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The user declined storage access.
    #[error("Permission denied: {0}")]
    PermissionDenied(Capability),

    /// The surface had no area at rasterization time.
    #[error("Surface is empty ({width}x{height})")]
    EmptySurface {
        /// Surface width in pixels.
        width: u32,
        /// Surface height in pixels.
        height: u32,
    },

    /// The pixel buffer could not be allocated or painted.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// The encoder could not produce a byte stream.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Writing the encoded image failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
