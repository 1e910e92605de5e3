//! Error types for solar-layers crates.

use thiserror::Error;

/// Result type alias using SolarError.
pub type SolarResult<T> = Result<T, SolarError>;

/// Primary error type for layer operations.
#[derive(Debug, Error)]
pub enum SolarError {
    // === Acquisition Errors ===
    #[error("Download failed for '{url}': {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to decode raster: {0}")]
    Decode(String),

    #[error("Geocoding unavailable: {0}")]
    GeocodeUnavailable(String),

    // === Input Errors ===
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),
}

impl SolarError {
    /// Build a download error from a URL and a transport- or status-level reason.
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        SolarError::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        SolarError::Decode(msg.into())
    }

    /// Build an insufficient-input error.
    pub fn insufficient_input(msg: impl Into<String>) -> Self {
        SolarError::InsufficientInput(msg.into())
    }

    /// Build an unknown-layer error.
    pub fn unknown_layer(id: impl Into<String>) -> Self {
        SolarError::UnknownLayer(id.into())
    }

    /// Build a rendering error.
    pub fn render(msg: impl Into<String>) -> Self {
        SolarError::Render(msg.into())
    }

    /// Whether synthetic fallback data is an acceptable substitute for the
    /// failed operation. Acquisition failures degrade; input and rendering
    /// errors are reported to the caller instead.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            SolarError::Download { .. } | SolarError::Decode(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for SolarError {
    fn from(err: std::io::Error) -> Self {
        SolarError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for SolarError {
    fn from(err: serde_json::Error) -> Self {
        SolarError::InsufficientInput(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degradable_classification() {
        assert!(SolarError::download("http://x/y.tif", "timeout").is_degradable());
        assert!(SolarError::decode("bad magic").is_degradable());
        assert!(!SolarError::UnknownLayer("marsh_gas".to_string()).is_degradable());
        assert!(!SolarError::InsufficientInput("no hourly URLs".to_string()).is_degradable());
    }

    #[test]
    fn test_download_message_carries_url() {
        let err = SolarError::download("http://host/mask.tif", "HTTP 404");
        let msg = err.to_string();
        assert!(msg.contains("http://host/mask.tif"));
        assert!(msg.contains("404"));
    }
}
