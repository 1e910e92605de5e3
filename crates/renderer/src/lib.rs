//! Color rendering for solar raster layers.
//!
//! Implements the visual half of the layer pipeline:
//! - Piecewise-linear palette ramps over a single raster band
//! - True-color composition from three-band imagery
//! - Legends describing a rendered value range

pub mod buffer_pool;
pub mod color;
pub mod legend;
pub mod palette;
pub mod render;

pub use color::{hex_to_rgb, interpolate_color, Color};
pub use legend::Legend;
pub use palette::Palette;
pub use render::{render_palette, render_rgb, PixelBuffer};
