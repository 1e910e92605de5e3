//! Raster fetching, caching, and layer orchestration.
//!
//! The top of the solar-layers stack: [`RasterStore`] pulls raster payloads
//! through a pluggable [`RasterSource`], decodes them with `geotiff-parser`,
//! and caches the grids; [`LayerOrchestrator`] coordinates the store with
//! the `renderer` and `shade-analysis` crates to produce ready-to-display
//! visualizations and detected shade sources for one building. Failed
//! fetches degrade to deterministic synthetic rasters so a missing layer
//! never blanks the whole analysis.

pub mod fallback;
pub mod layers;
pub mod orchestrator;
pub mod source;
pub mod store;

pub use layers::{LayerInfo, LayerKind};
pub use orchestrator::{
    BatchLoadResult, CacheStats, LayerFailure, LayerOrchestrator, LayerVisualization,
    RenderOptions,
};
pub use source::{HttpRasterSource, RasterSource};
pub use store::{RasterStore, StoreStats};
