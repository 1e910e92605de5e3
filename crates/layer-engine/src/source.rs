//! Transport abstraction for raster payloads.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, instrument};

use solar_common::{SolarError, SolarResult};

/// Default end-to-end request timeout. Roof rasters are small (a few MB at
/// most), so a stuck transfer is better cut off than waited out.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for sources that can fetch a raster payload by URL.
///
/// The transport owns timeout and cancellation policy; callers see only
/// success or a `Download` error. Tests inject in-memory implementations.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Fetch the payload behind `url`, authenticating with `api_key`.
    async fn fetch(&self, url: &str, api_key: &str) -> SolarResult<Bytes>;
}

/// HTTP raster source backed by a shared reqwest client.
pub struct HttpRasterSource {
    client: Client,
}

impl HttpRasterSource {
    /// Create a source with the default timeout.
    pub fn new() -> SolarResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a source with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> SolarResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                SolarError::download("*", format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RasterSource for HttpRasterSource {
    #[instrument(skip(self, api_key), fields(url = %url))]
    async fn fetch(&self, url: &str, api_key: &str) -> SolarResult<Bytes> {
        debug!("requesting raster");

        let mut request = self.client.get(url);
        if !api_key.is_empty() {
            request = request.query(&[("key", api_key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SolarError::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolarError::download(url, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SolarError::download(url, e.to_string()))?;

        debug!(size = bytes.len(), "raster payload received");
        Ok(bytes)
    }
}
