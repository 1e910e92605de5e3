//! Test data generators for creating synthetic solar-layer data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use solar_common::{GeoBounds, GridGeoref, RasterGrid};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
///
/// Useful for testing edge cases and simple scenarios.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a DSM-like elevation grid in meters.
///
/// A radial hill: tall at the center, falling off toward the edges.
/// Values range from `base` to roughly `base + peak`.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `base` - Elevation at the edges
/// * `peak` - Additional elevation at the center
pub fn create_elevation_grid(width: usize, height: usize, base: f32, peak: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let max_dist = ((center_x * center_x) + (center_y * center_y)).sqrt().max(1.0);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - center_x;
            let dy = row as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();
            data.push(base + (1.0 - dist / max_dist) * peak);
        }
    }
    data
}

/// Creates a solar-flux-like gradient grid in kWh/m²/year.
///
/// Values climb from `low` at the top-left to `high` at the bottom-right.
pub fn create_flux_grid(width: usize, height: usize, low: f32, high: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = high - low;
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(low + (x_factor * 0.5 + y_factor * 0.5) * span);
        }
    }
    data
}

/// Creates a 0/1 grid with ones inside the given rectangles.
///
/// Rectangles are `(x, y, width, height)` in pixels and may overlap.
/// Useful as a roof mask band or as flood-fill input.
pub fn create_binary_grid(
    width: usize,
    height: usize,
    one_rects: &[(usize, usize, usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(rx, ry, rw, rh) in one_rects {
        for y in ry..(ry + rh).min(height) {
            for x in rx..(rx + rw).min(width) {
                data[y * width + x] = 1.0;
            }
        }
    }
    data
}

/// Creates a bit-packed shade-mask grid.
///
/// Pixels inside the rectangles carry `(1 << (day - 1)) | (1 << hour)`,
/// marking them shaded for that day and hour; pixels outside are zero.
/// Keep `day` and `hour` small enough that the combined value is exactly
/// representable in f32 (both below bit 24), matching real payloads.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `shaded_rects` - `(x, y, width, height)` rectangles to shade
/// * `day` - Day of month, 1-31
/// * `hour` - Hour of day, 0-23
pub fn create_shade_mask_grid(
    width: usize,
    height: usize,
    shaded_rects: &[(usize, usize, usize, usize)],
    day: u32,
    hour: u32,
) -> Vec<f32> {
    let raw = ((1u64 << (day - 1)) | (1u64 << hour)) as f32;
    let mut data = vec![0.0f32; width * height];
    for &(rx, ry, rw, rh) in shaded_rects {
        for y in ry..(ry + rh).min(height) {
            for x in rx..(rx + rw).min(width) {
                data[y * width + x] = raw;
            }
        }
    }
    data
}

/// Creates a grid with NaN values at specified positions.
///
/// Useful for testing missing data handling.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Creates a grid with random-ish but deterministic values.
///
/// Uses a simple hash-based approach for reproducibility.
pub fn create_hashed_grid(width: usize, height: usize, seed: u32, max: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            data.push((hash % 10_000) as f32 / 10_000.0 * max);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
pub fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Georeferencing used by test grids: a small WGS84 footprint with
/// quarter-degree pixels anchored at (37.0, -122.0).
pub fn test_georef(width: usize, height: usize) -> GridGeoref {
    let origin = (-122.0, 37.0);
    let pixel_scale = (0.25, -0.25);
    GridGeoref {
        bounds: GeoBounds {
            north: origin.1,
            south: origin.1 + height as f64 * pixel_scale.1,
            east: origin.0 + width as f64 * pixel_scale.0,
            west: origin.0,
        },
        pixel_scale,
        origin,
        epsg: Some(4326),
    }
}

/// Builds a `RasterGrid` from band planes with the standard test georef.
///
/// Panics if a band has the wrong length; test inputs are expected to be
/// well formed.
pub fn make_grid(width: usize, height: usize, bands: Vec<Vec<f32>>) -> RasterGrid {
    RasterGrid::new(width, height, bands, None, test_georef(width, height))
        .expect("test bands must match grid dimensions")
}

/// Same as [`make_grid`] but with a no-data sentinel.
pub fn make_grid_with_no_data(
    width: usize,
    height: usize,
    bands: Vec<Vec<f32>>,
    no_data: f32,
) -> RasterGrid {
    RasterGrid::new(width, height, bands, Some(no_data), test_georef(width, height))
        .expect("test bands must match grid dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_create_elevation_grid() {
        let grid = create_elevation_grid(100, 100, 10.0, 25.0);
        assert_eq!(grid.len(), 10_000);
        let center = grid[50 * 100 + 50];
        let corner = grid[0];
        assert!(center > corner);
        assert!(corner >= 10.0);
        assert!(center <= 35.01);
    }

    #[test]
    fn test_create_binary_grid() {
        let grid = create_binary_grid(10, 10, &[(2, 3, 4, 2)]);
        assert_eq!(grid[3 * 10 + 2], 1.0);
        assert_eq!(grid[4 * 10 + 5], 1.0);
        assert_eq!(grid[3 * 10 + 6], 0.0);
        assert_eq!(grid.iter().filter(|&&v| v == 1.0).count(), 8);
    }

    #[test]
    fn test_shade_mask_values() {
        let grid = create_shade_mask_grid(4, 4, &[(0, 0, 2, 2)], 5, 14);
        let expected = ((1u64 << 4) | (1u64 << 14)) as f32;
        assert_eq!(grid[0], expected);
        assert_eq!(grid[5], expected);
        assert_eq!(grid[15], 0.0);
    }

    #[test]
    fn test_hashed_grid_deterministic() {
        let a = create_hashed_grid(50, 50, 42, 100.0);
        let b = create_hashed_grid(50, 50, 42, 100.0);
        assert_eq!(a, b, "Same seed should produce same data");

        let c = create_hashed_grid(50, 50, 43, 100.0);
        assert_ne!(a, c, "Different seed should produce different data");
    }

    #[test]
    fn test_make_grid_georef() {
        let grid = make_grid(8, 8, vec![create_constant_grid(8, 8, 1.0)]);
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.georef.epsg, Some(4326));
        assert!((grid.georef.bounds.south - 35.0).abs() < 1e-9);
    }
}
