//! Synthetic stand-in rasters for failed fetches.
//!
//! Every requested layer must render something, so transport and decode
//! failures degrade to a generated grid instead of an empty response. The
//! pattern is a radial decay with a ripple whose phase is derived from the
//! URL, making repeated failures for the same layer byte-identical while
//! keeping different layers visually distinguishable.

use solar_common::{GeoBounds, GridGeoref, RasterGrid, SolarResult};
use tracing::debug;

/// Edge length of generated fallback grids.
pub const FALLBACK_SIZE: usize = 256;

/// Placement for rasters that carry none of their own: a roof-scale WGS84
/// footprint anchored near the provider's test fixtures.
pub fn synthetic_georef(width: usize, height: usize) -> GridGeoref {
    let origin = (-122.0, 37.0);
    let pixel_scale = (1.0e-5, -1.0e-5);
    GridGeoref {
        bounds: GeoBounds::new(
            origin.1,
            origin.1 + height as f64 * pixel_scale.1,
            origin.0 + width as f64 * pixel_scale.0,
            origin.0,
        ),
        pixel_scale,
        origin,
        epsg: Some(4326),
    }
}

/// FNV-1a over the URL bytes; stable across runs and platforms.
fn url_seed(url: &str) -> u32 {
    let mut hash = 0x811c_9dc5u32;
    for byte in url.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Build the deterministic fallback grid for `url`.
///
/// Three identical bands cover every layer kind: single-band renders read
/// band 0 and true-color renders read all three. Values span [0, 100] with
/// the peak at the frame center.
pub fn fallback_grid(url: &str) -> SolarResult<RasterGrid> {
    let width = FALLBACK_SIZE;
    let height = FALLBACK_SIZE;

    // Phase in [0, 2pi) so URLs shift the ripple rather than the shape.
    let phase = (url_seed(url) % 6283) as f32 / 1000.0;

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let max_dist = (center_x * center_x + center_y * center_y).sqrt();

    let mut band = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();

            let decay = 1.0 - dist / max_dist;
            let ripple = (dist / 12.0 + phase).sin() * 0.08;
            band.push((decay + ripple).clamp(0.0, 1.0) * 100.0);
        }
    }

    debug!(url = %url, size = FALLBACK_SIZE, "built synthetic fallback grid");
    let bands = vec![band.clone(), band.clone(), band];
    RasterGrid::new(width, height, bands, None, synthetic_georef(width, height))
}
