//! Shared test utilities for the solar-layers workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Deterministic raster and shade-mask generators
//! - An in-memory GeoTIFF encoder for feeding the decoder and layer engine
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;
pub mod tiff;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use tiff::{SampleKind, TiffBuilder};
