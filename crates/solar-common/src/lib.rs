//! Common types and utilities shared across the solar-layers crates.

pub mod bounds;
pub mod error;
pub mod grid;
pub mod insights;
pub mod stats;

pub use bounds::GeoBounds;
pub use error::{SolarError, SolarResult};
pub use grid::{GridGeoref, RasterGrid};
pub use insights::{BuildingInsights, DataLayerUrls, LatLng, RoofSegment, SolarPotential};
pub use stats::BandStatistics;
