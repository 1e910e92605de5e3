//! Error types for GeoTIFF decoding.

use thiserror::Error;

/// Result type alias using GeoTiffError.
pub type Result<T> = std::result::Result<T, GeoTiffError>;

/// Errors produced while decoding a GeoTIFF payload.
#[derive(Debug, Error)]
pub enum GeoTiffError {
    #[error("Invalid TIFF container: {0}")]
    InvalidContainer(String),

    #[error("Truncated TIFF data: {0}")]
    Truncated(String),

    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    #[error("Unsupported compression scheme {0}")]
    UnsupportedCompression(u16),

    #[error("Unsupported sample layout: format {format}, {bits} bits per sample")]
    UnsupportedSampleFormat { format: u16, bits: u16 },

    #[error("Decompression failed: {0}")]
    Decompress(String),
}

impl GeoTiffError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GeoTiffError::InvalidContainer(msg.into())
    }

    pub fn truncated(msg: impl Into<String>) -> Self {
        GeoTiffError::Truncated(msg.into())
    }
}

impl From<GeoTiffError> for solar_common::SolarError {
    fn from(err: GeoTiffError) -> Self {
        solar_common::SolarError::Decode(err.to_string())
    }
}
