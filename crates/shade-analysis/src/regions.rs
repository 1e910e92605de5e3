//! Connected-component extraction over binary grids.

use tracing::warn;

use crate::temporal::BinaryGrid;

/// Regions smaller than this many pixels are noise and get dropped.
pub const DEFAULT_MIN_REGION_SIZE: usize = 10;

/// Inclusive pixel-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// One connected component of set pixels.
///
/// All member pixels are mutually reachable through 4-connected member
/// pixels; a region never spans disjoint islands.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Member pixel coordinates. Non-empty; order is unspecified.
    pub pixels: Vec<(u32, u32)>,
    pub bounds: PixelBounds,
    /// Bounding-box midpoint.
    pub center: (f32, f32),
    /// Average of the source values at member pixels.
    pub mean_intensity: f32,
}

impl Region {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

/// Extract connected shaded regions from a binary grid.
///
/// Regions with fewer than `min_region_size` pixels are discarded. Zero
/// regions is a valid result.
pub fn extract(grid: &BinaryGrid, min_region_size: usize) -> Vec<Region> {
    let cells = grid.cells();
    extract_where(
        grid.width(),
        grid.height(),
        |idx| cells[idx] != 0,
        |idx| cells[idx] as f32,
        min_region_size,
    )
}

/// Extract connected regions of samples strictly above `threshold`.
///
/// `mean_intensity` carries the average sample value per region.
pub fn extract_above(
    values: &[f32],
    width: usize,
    height: usize,
    threshold: f32,
    min_region_size: usize,
) -> Vec<Region> {
    if values.len() != width * height {
        warn!(
            samples = values.len(),
            width, height, "sample count does not match dimensions, no regions extracted"
        );
        return Vec::new();
    }
    extract_where(
        width,
        height,
        |idx| values[idx] > threshold,
        |idx| values[idx],
        min_region_size,
    )
}

/// Flood fill every unvisited set pixel in row-major seed order.
///
/// The fill itself is iterative over an explicit stack: recursion depth
/// would track region size and overflow on large contiguous areas.
fn extract_where<S, I>(
    width: usize,
    height: usize,
    is_set: S,
    intensity: I,
    min_region_size: usize,
) -> Vec<Region>
where
    S: Fn(usize) -> bool,
    I: Fn(usize) -> f32,
{
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; width * height];
    let mut regions = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for seed_y in 0..height {
        for seed_x in 0..width {
            let seed_idx = seed_y * width + seed_x;
            if visited[seed_idx] || !is_set(seed_idx) {
                continue;
            }

            visited[seed_idx] = true;
            stack.push((seed_x as u32, seed_y as u32));

            let mut pixels = Vec::new();
            let mut sum = 0.0f64;

            while let Some((x, y)) = stack.pop() {
                let idx = y as usize * width + x as usize;
                pixels.push((x, y));
                sum += intensity(idx) as f64;

                // 4-connected neighbors only.
                if x > 0 {
                    push_if_set(&mut stack, &mut visited, &is_set, width, x - 1, y);
                }
                if (x as usize) + 1 < width {
                    push_if_set(&mut stack, &mut visited, &is_set, width, x + 1, y);
                }
                if y > 0 {
                    push_if_set(&mut stack, &mut visited, &is_set, width, x, y - 1);
                }
                if (y as usize) + 1 < height {
                    push_if_set(&mut stack, &mut visited, &is_set, width, x, y + 1);
                }
            }

            if pixels.len() >= min_region_size {
                let mean = (sum / pixels.len() as f64) as f32;
                regions.push(build_region(pixels, mean));
            }
        }
    }

    regions
}

fn push_if_set<S: Fn(usize) -> bool>(
    stack: &mut Vec<(u32, u32)>,
    visited: &mut [bool],
    is_set: &S,
    width: usize,
    x: u32,
    y: u32,
) {
    let idx = y as usize * width + x as usize;
    if !visited[idx] && is_set(idx) {
        visited[idx] = true;
        stack.push((x, y));
    }
}

fn build_region(pixels: Vec<(u32, u32)>, mean_intensity: f32) -> Region {
    let mut bounds = PixelBounds {
        min_x: u32::MAX,
        min_y: u32::MAX,
        max_x: 0,
        max_y: 0,
    };
    for &(x, y) in &pixels {
        bounds.min_x = bounds.min_x.min(x);
        bounds.min_y = bounds.min_y.min(y);
        bounds.max_x = bounds.max_x.max(x);
        bounds.max_y = bounds.max_y.max(y);
    }
    let center = (
        (bounds.min_x + bounds.max_x) as f32 / 2.0,
        (bounds.min_y + bounds.max_y) as f32 / 2.0,
    );
    Region {
        pixels,
        bounds,
        center,
        mean_intensity,
    }
}
