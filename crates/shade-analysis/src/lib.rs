//! Temporal shade decoding and shade-source detection.
//!
//! Turns bit-packed hourly shade rasters into boolean shaded/lit grids,
//! extracts connected shaded regions, and classifies those regions into
//! typed shade sources (buildings, trees, terrain, other structures).

pub mod classify;
pub mod regions;
pub mod temporal;

pub use classify::{RegionFeatures, ShadeClassifier, ShadeSource, ShadeSourceKind};
pub use regions::{extract, extract_above, PixelBounds, Region, DEFAULT_MIN_REGION_SIZE};
pub use temporal::{decode, decode_day, BinaryGrid, HOURS_PER_DAY};
