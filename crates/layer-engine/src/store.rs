//! Decoded-raster cache keyed by request identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use solar_common::{RasterGrid, SolarResult};

use crate::fallback;
use crate::source::RasterSource;

/// Usage counters for one store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub last_insert: Option<DateTime<Utc>>,
}

struct CacheState {
    grids: HashMap<String, Arc<RasterGrid>>,
    last_insert: Option<DateTime<Utc>>,
}

/// Fetches, decodes, and caches rasters for one building session.
///
/// Decoded grids are shared behind `Arc` and keyed by the exact request
/// identity (URL plus auth key). Entries are never evicted; layer sets are
/// small and reused for the life of the session, so the cache only empties
/// on an explicit [`clear`](RasterStore::clear).
pub struct RasterStore {
    source: Arc<dyn RasterSource>,
    cache: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RasterStore {
    pub fn new(source: Arc<dyn RasterSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(CacheState {
                grids: HashMap::new(),
                last_insert: None,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn cache_key(url: &str, api_key: &str) -> String {
        format!("{}|{}", url, api_key)
    }

    /// Fetch and decode a raster, caching the result.
    ///
    /// Transport and payload failures surface as `Download` and `Decode`
    /// errors; see [`fetch`](RasterStore::fetch) for the degrading variant.
    #[instrument(skip(self, api_key), fields(url = %url))]
    pub async fn try_fetch(&self, url: &str, api_key: &str) -> SolarResult<Arc<RasterGrid>> {
        let key = Self::cache_key(url, api_key);

        if let Some(grid) = self.cache.read().await.grids.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("raster cache hit");
            return Ok(Arc::clone(grid));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // No lock held across the fetch. Two callers racing on a fresh key
        // may both decode; the first insert wins below.
        let payload = self.source.fetch(url, api_key).await?;
        let decoded = geotiff_parser::decode(&payload)?;
        let width = decoded.width;
        let height = decoded.height;
        let grid = Arc::new(decoded.into_grid(fallback::synthetic_georef(width, height))?);

        let mut cache = self.cache.write().await;
        if let Some(existing) = cache.grids.get(&key) {
            return Ok(Arc::clone(existing));
        }

        debug!(
            width = grid.width(),
            height = grid.height(),
            bands = grid.band_count(),
            "raster decoded and cached"
        );
        cache.grids.insert(key, Arc::clone(&grid));
        cache.last_insert = Some(Utc::now());
        Ok(grid)
    }

    /// Fetch a raster, degrading to a deterministic synthetic grid when the
    /// transport or the decode fails.
    ///
    /// The failure is logged, not propagated, so every requested layer can
    /// still render. Fallback grids are never cached: the next request for
    /// the same key retries the real source.
    pub async fn fetch(&self, url: &str, api_key: &str) -> SolarResult<Arc<RasterGrid>> {
        match self.try_fetch(url, api_key).await {
            Ok(grid) => Ok(grid),
            Err(err) if err.is_degradable() => {
                warn!(url = %url, error = %err, "raster fetch failed, serving synthetic fallback");
                Ok(Arc::new(fallback::fallback_grid(url)?))
            }
            Err(err) => Err(err),
        }
    }

    /// Number of cached grids.
    pub async fn len(&self) -> usize {
        self.cache.read().await.grids.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.grids.is_empty()
    }

    /// Snapshot of cache usage.
    pub async fn stats(&self) -> StoreStats {
        let cache = self.cache.read().await;
        StoreStats {
            entries: cache.grids.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            last_insert: cache.last_insert,
        }
    }

    /// Drop every cached grid. Counters are left running.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let dropped = cache.grids.len();
        cache.grids.clear();
        cache.last_insert = None;
        debug!(dropped, "raster cache cleared");
    }
}
