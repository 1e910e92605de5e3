//! Top-level layer orchestration for one building.
//!
//! Turns a building's data-layer URL set into named, ready-to-display
//! visualizations and detected shade sources. Fetching and decoding go
//! through [`RasterStore`]; rendering and shade analysis are delegated to
//! the `renderer` and `shade-analysis` crates. Rendered layers are cached
//! per (layer, options) so repeated UI requests are cheap.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use renderer::{Legend, Palette, PixelBuffer};
use shade_analysis::{classify, ShadeClassifier, ShadeSource, DEFAULT_MIN_REGION_SIZE};
use solar_common::{
    BandStatistics, DataLayerUrls, GeoBounds, RasterGrid, SolarError, SolarResult,
};

use crate::layers::{LayerInfo, LayerKind};
use crate::source::RasterSource;
use crate::store::RasterStore;

/// Rendering context shared by all layer requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Month 1-12; selects the monthly-flux band and the hourly-shade URL.
    pub month: u32,
    /// Day of month 1-31 for hourly-shade decoding.
    pub day: u32,
    /// Blank out everything beyond the roof using the mask layer.
    pub show_roof_only: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        // Mid-June: long days, so shade structure is at its clearest.
        Self {
            month: 6,
            day: 15,
            show_roof_only: false,
        }
    }
}

/// A rendered, ready-to-display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerVisualization {
    pub id: String,
    pub label: String,
    pub width: usize,
    pub height: usize,
    /// RGBA bytes, row-major, 4 per pixel.
    pub pixels: Vec<u8>,
    /// Present for layers with a meaningful value scale.
    pub legend: Option<Legend>,
    pub bounds: GeoBounds,
}

/// One failed layer from a batch load.
#[derive(Debug)]
pub struct LayerFailure {
    pub id: String,
    pub error: SolarError,
}

/// Outcome of a concurrent multi-layer load. Failures are per-item; a bad
/// layer never cancels its siblings.
#[derive(Debug, Default)]
pub struct BatchLoadResult {
    pub visualizations: Vec<Arc<LayerVisualization>>,
    pub failures: Vec<LayerFailure>,
}

/// Entry counts for the two orchestrator-level caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub layers: usize,
    pub visualizations: usize,
}

/// Coordinates fetching, rendering, and shade analysis for one building.
pub struct LayerOrchestrator {
    urls: DataLayerUrls,
    api_key: String,
    store: RasterStore,
    visualizations: RwLock<HashMap<String, Arc<LayerVisualization>>>,
    classifier_seed: u64,
}

impl LayerOrchestrator {
    pub fn new(
        urls: DataLayerUrls,
        api_key: impl Into<String>,
        source: Arc<dyn RasterSource>,
    ) -> Self {
        Self::with_classifier_seed(urls, api_key, source, classify::DEFAULT_SEED)
    }

    /// Like [`new`](LayerOrchestrator::new) with an explicit seed for the
    /// shade classifier's height jitter.
    pub fn with_classifier_seed(
        urls: DataLayerUrls,
        api_key: impl Into<String>,
        source: Arc<dyn RasterSource>,
        classifier_seed: u64,
    ) -> Self {
        Self {
            urls,
            api_key: api_key.into(),
            store: RasterStore::new(source),
            visualizations: RwLock::new(HashMap::new()),
            classifier_seed,
        }
    }

    /// Every known layer id with whether the URL set carries it.
    pub fn available_layers(&self) -> Vec<LayerInfo> {
        LayerKind::ALL
            .iter()
            .map(|kind| LayerInfo {
                id: kind.id().to_string(),
                label: kind.label().to_string(),
                available: kind.url(&self.urls, 1).is_some(),
            })
            .collect()
    }

    /// Render one layer by id, serving from the visualization cache when
    /// the same (layer, options) pair was rendered before.
    #[instrument(skip(self, opts), fields(layer = %id))]
    pub async fn render_layer(
        &self,
        id: &str,
        opts: &RenderOptions,
    ) -> SolarResult<Arc<LayerVisualization>> {
        let kind = LayerKind::parse(id).ok_or_else(|| SolarError::unknown_layer(id))?;
        validate_options(opts)?;

        let key = visualization_key(kind, opts);
        if let Some(viz) = self.visualizations.read().await.get(&key) {
            debug!("visualization cache hit");
            return Ok(Arc::clone(viz));
        }

        let viz = Arc::new(self.build_visualization(kind, opts).await?);
        info!(
            width = viz.width,
            height = viz.height,
            "rendered layer"
        );

        let mut cache = self.visualizations.write().await;
        let entry = cache.entry(key).or_insert_with(|| Arc::clone(&viz));
        Ok(Arc::clone(entry))
    }

    /// Detect shade sources for the requested (month, day).
    ///
    /// All 24 hourly masks are decoded and analyzed together: no single
    /// hour reveals every shade caster, so regions are extracted per hour
    /// and duplicates merged across the day.
    #[instrument(skip(self, opts), fields(month = opts.month, day = opts.day))]
    pub async fn shade_sources(&self, opts: &RenderOptions) -> SolarResult<Vec<ShadeSource>> {
        validate_options(opts)?;
        let url = self.urls.hourly_shade_url(opts.month).ok_or_else(|| {
            SolarError::insufficient_input(format!(
                "no hourly shade URL for month {}",
                opts.month
            ))
        })?;
        let url = url.to_string();

        let grid = self.store.fetch(&url, &self.api_key).await?;
        let hours = shade_analysis::decode_day(&grid, opts.day)?;

        let mut classifier = ShadeClassifier::with_seed(self.classifier_seed);
        let sources = classifier.detect_shade_sources(&hours, DEFAULT_MIN_REGION_SIZE);
        info!(sources = sources.len(), "detected shade sources");
        Ok(sources)
    }

    /// Render several layers concurrently.
    ///
    /// All fetches are issued at once and joined; per-layer failures are
    /// collected into [`BatchLoadResult::failures`] without aborting the
    /// rest of the batch.
    pub async fn batch_load(&self, ids: &[&str], opts: &RenderOptions) -> BatchLoadResult {
        let tasks = ids.iter().map(|&id| async move {
            let outcome = self.render_layer(id, opts).await;
            (id, outcome)
        });
        let outcomes = join_all(tasks).await;

        let mut result = BatchLoadResult::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(viz) => result.visualizations.push(viz),
                Err(error) => {
                    warn!(layer = %id, error = %error, "layer failed to load");
                    result.failures.push(LayerFailure {
                        id: id.to_string(),
                        error,
                    });
                }
            }
        }
        info!(
            loaded = result.visualizations.len(),
            failed = result.failures.len(),
            "batch load finished"
        );
        result
    }

    /// Entry counts for the raster and visualization caches.
    pub async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            layers: self.store.len().await,
            visualizations: self.visualizations.read().await.len(),
        }
    }

    /// Drop all cached rasters and rendered layers.
    pub async fn clear_cache(&self) {
        self.store.clear().await;
        self.visualizations.write().await.clear();
        debug!("orchestrator caches cleared");
    }

    async fn build_visualization(
        &self,
        kind: LayerKind,
        opts: &RenderOptions,
    ) -> SolarResult<LayerVisualization> {
        let url = match kind.url(&self.urls, opts.month) {
            Some(u) => u.to_string(),
            None => {
                let msg = if kind == LayerKind::HourlyShade {
                    format!("no hourly shade URL for month {}", opts.month)
                } else {
                    format!("no URL for layer '{}'", kind.id())
                };
                return Err(SolarError::insufficient_input(msg));
            }
        };

        let grid = self.store.fetch(&url, &self.api_key).await?;
        let mask = if opts.show_roof_only && kind != LayerKind::Mask {
            Some(self.roof_mask().await?)
        } else {
            None
        };
        let mask_ref = mask.as_deref();

        let (image, legend) = match kind {
            LayerKind::Mask => {
                let image =
                    renderer::render_palette(&grid, 0, mask_ref, Palette::binary(), 0.0, 1.0)?;
                (image, None)
            }
            LayerKind::Dsm => {
                let stats = band_stats(&grid, 0);
                let palette = Palette::rainbow();
                let image =
                    renderer::render_palette(&grid, 0, mask_ref, palette, stats.min, stats.max)?;
                let legend =
                    Legend::from_palette(kind.label(), palette, stats.min, stats.max, "m");
                (image, Some(legend))
            }
            LayerKind::Rgb => (renderer::render_rgb(&grid, mask_ref)?, None),
            LayerKind::AnnualFlux => {
                let stats = band_stats(&grid, 0);
                let palette = Palette::iron();
                let image =
                    renderer::render_palette(&grid, 0, mask_ref, palette, stats.min, stats.max)?;
                let legend = Legend::from_palette(
                    kind.label(),
                    palette,
                    stats.min,
                    stats.max,
                    "kWh/kW/year",
                );
                (image, Some(legend))
            }
            LayerKind::MonthlyFlux => {
                let band = monthly_band(&grid, opts.month);
                let stats = band_stats(&grid, band);
                let palette = Palette::iron();
                let image =
                    renderer::render_palette(&grid, band, mask_ref, palette, stats.min, stats.max)?;
                let legend = Legend::from_palette(
                    kind.label(),
                    palette,
                    stats.min,
                    stats.max,
                    "kWh/kW/month",
                );
                (image, Some(legend))
            }
            LayerKind::HourlyShade => {
                let sunlit = sunlit_hours_grid(&grid, opts.day)?;
                let palette = Palette::sunlight();
                let hours = shade_analysis::HOURS_PER_DAY as f32;
                let image =
                    renderer::render_palette(&sunlit, 0, mask_ref, palette, 0.0, hours)?;
                let legend = Legend::from_palette(kind.label(), palette, 0.0, hours, "h of sun");
                (image, Some(legend))
            }
        };

        Ok(visualization(kind, image, legend, grid.georef.bounds))
    }

    /// The roof mask raster, fetched through the store (so at most once).
    async fn roof_mask(&self) -> SolarResult<Arc<RasterGrid>> {
        let url = self.urls.mask_url.as_deref().ok_or_else(|| {
            SolarError::insufficient_input(
                "roof-only rendering requested but the URL set has no mask".to_string(),
            )
        })?;
        let url = url.to_string();
        self.store.fetch(&url, &self.api_key).await
    }
}

fn visualization(
    kind: LayerKind,
    image: PixelBuffer,
    legend: Option<Legend>,
    bounds: GeoBounds,
) -> LayerVisualization {
    LayerVisualization {
        id: kind.id().to_string(),
        label: kind.label().to_string(),
        width: image.width,
        height: image.height,
        pixels: image.pixels,
        legend,
        bounds,
    }
}

fn validate_options(opts: &RenderOptions) -> SolarResult<()> {
    if !(1..=12).contains(&opts.month) {
        return Err(SolarError::insufficient_input(format!(
            "month {} outside 1..=12",
            opts.month
        )));
    }
    if !(1..=31).contains(&opts.day) {
        return Err(SolarError::insufficient_input(format!(
            "day {} outside 1..=31",
            opts.day
        )));
    }
    Ok(())
}

/// Cache key for a rendered layer. Options only participate for the kinds
/// they actually affect, so toggling the month does not re-render static
/// layers.
fn visualization_key(kind: LayerKind, opts: &RenderOptions) -> String {
    let (month, day) = match kind {
        LayerKind::MonthlyFlux => (opts.month, 0),
        LayerKind::HourlyShade => (opts.month, opts.day),
        _ => (0, 0),
    };
    // The mask layer never masks itself, so the flag cannot change it.
    let roof_only = opts.show_roof_only && kind != LayerKind::Mask;
    format!("{}|{}|{}|{}", kind.id(), month, day, roof_only)
}

fn band_stats(grid: &RasterGrid, band: usize) -> BandStatistics {
    grid.band_statistics(band)
        .unwrap_or_else(BandStatistics::zero)
}

/// Band for a 1-based month in a monthly-flux raster, clamped when a
/// degraded grid carries fewer than 12 bands.
fn monthly_band(grid: &RasterGrid, month: u32) -> usize {
    let wanted = (month - 1) as usize;
    let available = grid.band_count();
    if available == 0 || wanted < available {
        return wanted;
    }
    warn!(
        month,
        bands = available,
        "monthly raster is missing the requested band, using the last"
    );
    available - 1
}

/// Per-pixel count of direct-sun hours for one day, as a single-band grid
/// sharing the source raster's placement.
fn sunlit_hours_grid(grid: &RasterGrid, day: u32) -> SolarResult<RasterGrid> {
    let hours = shade_analysis::decode_day(grid, day)?;
    let width = grid.width();
    let height = grid.height();

    let counts = renderer::buffer_pool::take_sample_buffer(width, height, |buf| {
        for hour in &hours {
            for (i, &cell) in hour.cells().iter().enumerate() {
                if cell == 0 {
                    buf[i] += 1.0;
                }
            }
        }
    });

    RasterGrid::new(width, height, vec![counts], None, grid.georef)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RenderOptions::default();
        assert_eq!(opts.month, 6);
        assert_eq!(opts.day, 15);
        assert!(!opts.show_roof_only);
    }

    #[test]
    fn test_validate_options_bounds() {
        let mut opts = RenderOptions::default();
        assert!(validate_options(&opts).is_ok());

        opts.month = 0;
        assert!(validate_options(&opts).is_err());
        opts.month = 13;
        assert!(validate_options(&opts).is_err());

        opts.month = 12;
        opts.day = 32;
        assert!(validate_options(&opts).is_err());
    }

    #[test]
    fn test_visualization_key_ignores_month_for_static_layers() {
        let june = RenderOptions::default();
        let december = RenderOptions {
            month: 12,
            ..june
        };

        assert_eq!(
            visualization_key(LayerKind::Dsm, &june),
            visualization_key(LayerKind::Dsm, &december)
        );
        assert_ne!(
            visualization_key(LayerKind::MonthlyFlux, &june),
            visualization_key(LayerKind::MonthlyFlux, &december)
        );
        assert_ne!(
            visualization_key(LayerKind::HourlyShade, &june),
            visualization_key(
                LayerKind::HourlyShade,
                &RenderOptions {
                    day: 16,
                    ..june
                }
            )
        );
    }

    #[test]
    fn test_visualization_key_ignores_roof_flag_for_mask() {
        let plain = RenderOptions::default();
        let roofed = RenderOptions {
            show_roof_only: true,
            ..plain
        };

        assert_eq!(
            visualization_key(LayerKind::Mask, &plain),
            visualization_key(LayerKind::Mask, &roofed)
        );
        assert_ne!(
            visualization_key(LayerKind::Dsm, &plain),
            visualization_key(LayerKind::Dsm, &roofed)
        );
    }

    #[test]
    fn test_monthly_band_clamps_on_degraded_grids() {
        let georef = crate::fallback::synthetic_georef(2, 2);
        let grid =
            RasterGrid::new(2, 2, vec![vec![0.0; 4]; 3], None, georef).unwrap();

        assert_eq!(monthly_band(&grid, 1), 0);
        assert_eq!(monthly_band(&grid, 3), 2);
        assert_eq!(monthly_band(&grid, 12), 2);
    }

    #[test]
    fn test_cache_stats_serialize_camel_case() {
        let stats = CacheStats {
            layers: 3,
            visualizations: 5,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, "{\"layers\":3,\"visualizations\":5}");
    }
}
