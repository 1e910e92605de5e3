//! Raster-to-image rendering.

use solar_common::{RasterGrid, SolarError, SolarResult};
use tracing::debug;

use crate::buffer_pool;
use crate::color::Color;
use crate::palette::Palette;

/// A rendered RGBA image, 4 bytes per pixel in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// RGBA channels at (x, y), or None when out of range.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = (y * self.width + x) * 4;
        Some([
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ])
    }
}

/// Render one band through a color ramp.
///
/// Samples are normalized to [0, 1] via `(value - min) / (max - min)`,
/// clamped, then mapped through `palette`. Pixels that are no-data,
/// non-finite, or masked out (mask band sample equals zero) come out fully
/// transparent. When `max` does not exceed `min` the range is degenerate
/// and every valid pixel renders as the first palette stop.
pub fn render_palette(
    grid: &RasterGrid,
    band_index: usize,
    mask: Option<&RasterGrid>,
    palette: &Palette,
    min: f32,
    max: f32,
) -> SolarResult<PixelBuffer> {
    let width = grid.width();
    let height = grid.height();
    let band = grid.band(band_index).ok_or_else(|| {
        SolarError::render(format!(
            "band {} out of range for raster with {} bands",
            band_index,
            grid.band_count()
        ))
    })?;
    let mask_band = mask_band(grid, mask)?;

    let range = max - min;
    let degenerate = !(range > 0.0) || !range.is_finite();
    if degenerate {
        debug!(min, max, "palette range degenerate, rendering first stop");
    }

    let pixels = buffer_pool::take_pixel_buffer(width, height, |buf| {
        for (idx, &value) in band.iter().enumerate() {
            if !value.is_finite() || grid.is_no_data(value) {
                continue;
            }
            if let Some((samples, m)) = mask_band {
                let mv = samples[idx];
                if mv == 0.0 || m.is_no_data(mv) {
                    continue;
                }
            }

            let color = if degenerate {
                palette.colors()[0]
            } else {
                palette.sample(((value - min) / range).clamp(0.0, 1.0))
            };
            write_pixel(buf, idx, color);
        }
    });

    Ok(PixelBuffer {
        width,
        height,
        pixels,
    })
}

/// Render a three-band raster as true color.
///
/// Bands 0/1/2 map directly to R/G/B with each channel clamped to
/// [0, 255] and no normalization. Valid pixels get alpha 255; no-data or
/// masked-out pixels are fully transparent.
pub fn render_rgb(grid: &RasterGrid, mask: Option<&RasterGrid>) -> SolarResult<PixelBuffer> {
    let width = grid.width();
    let height = grid.height();
    if grid.band_count() < 3 {
        return Err(SolarError::render(format!(
            "true-color render needs 3 bands, raster has {}",
            grid.band_count()
        )));
    }
    let (red, green, blue) = match (grid.band(0), grid.band(1), grid.band(2)) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => {
            return Err(SolarError::render(
                "true-color render needs 3 bands".to_string(),
            ))
        }
    };
    let mask_band = mask_band(grid, mask)?;

    let pixels = buffer_pool::take_pixel_buffer(width, height, |buf| {
        for idx in 0..width * height {
            let (r, g, b) = (red[idx], green[idx], blue[idx]);
            if [r, g, b]
                .iter()
                .any(|&v| !v.is_finite() || grid.is_no_data(v))
            {
                continue;
            }
            if let Some((samples, m)) = mask_band {
                let mv = samples[idx];
                if mv == 0.0 || m.is_no_data(mv) {
                    continue;
                }
            }

            write_pixel(
                buf,
                idx,
                Color::opaque(
                    r.clamp(0.0, 255.0) as u8,
                    g.clamp(0.0, 255.0) as u8,
                    b.clamp(0.0, 255.0) as u8,
                ),
            );
        }
    });

    Ok(PixelBuffer {
        width,
        height,
        pixels,
    })
}

/// Band 0 of the mask raster, dimension-checked against the target grid.
fn mask_band<'a>(
    grid: &RasterGrid,
    mask: Option<&'a RasterGrid>,
) -> SolarResult<Option<(&'a [f32], &'a RasterGrid)>> {
    let Some(m) = mask else {
        return Ok(None);
    };
    if m.width() != grid.width() || m.height() != grid.height() {
        return Err(SolarError::render(format!(
            "mask {}x{} does not match raster {}x{}",
            m.width(),
            m.height(),
            grid.width(),
            grid.height()
        )));
    }
    let samples = m
        .band(0)
        .ok_or_else(|| SolarError::render("mask raster has no bands".to_string()))?;
    Ok(Some((samples, m)))
}

#[inline]
fn write_pixel(buf: &mut [u8], idx: usize, color: Color) {
    let o = idx * 4;
    buf[o] = color.r;
    buf[o + 1] = color.g;
    buf[o + 2] = color.b;
    buf[o + 3] = color.a;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{create_constant_grid, make_grid, make_grid_with_no_data};

    fn ramp() -> Palette {
        Palette::from_hex("test", &["000000", "FFFFFF"]).unwrap()
    }

    #[test]
    fn test_palette_endpoints_map_to_first_and_last_stop() {
        let grid = make_grid(2, 1, vec![vec![0.0, 100.0]]);
        let img = render_palette(&grid, 0, None, &ramp(), 0.0, 100.0).unwrap();

        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(img.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let grid = make_grid(2, 1, vec![vec![-50.0, 500.0]]);
        let img = render_palette(&grid, 0, None, &ramp(), 0.0, 100.0).unwrap();

        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(img.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_no_data_pixels_are_transparent() {
        let grid = make_grid_with_no_data(2, 1, vec![vec![-9999.0, 50.0]], -9999.0);
        let img = render_palette(&grid, 0, None, &ramp(), 0.0, 100.0).unwrap();

        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(1, 0), Some([127, 127, 127, 255]));
    }

    #[test]
    fn test_nan_pixels_are_transparent() {
        let grid = make_grid(2, 1, vec![vec![f32::NAN, 100.0]]);
        let img = render_palette(&grid, 0, None, &ramp(), 0.0, 100.0).unwrap();

        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_mask_zero_blanks_pixel() {
        let grid = make_grid(2, 1, vec![vec![60.0, 60.0]]);
        let mask = make_grid(2, 1, vec![vec![0.0, 1.0]]);
        let img = render_palette(&grid, 0, Some(&mask), &ramp(), 0.0, 100.0).unwrap();

        assert_eq!(img.pixel(0, 0).map(|p| p[3]), Some(0));
        assert_eq!(img.pixel(1, 0).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_degenerate_range_renders_first_stop() {
        let grid = make_grid(3, 3, vec![create_constant_grid(3, 3, 5.0)]);
        let img = render_palette(&grid, 0, None, &ramp(), 5.0, 5.0).unwrap();

        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(img.pixel(x, y), Some([0, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_mismatched_mask_rejected() {
        let grid = make_grid(2, 2, vec![vec![1.0; 4]]);
        let mask = make_grid(3, 3, vec![vec![1.0; 9]]);
        assert!(render_palette(&grid, 0, Some(&mask), &ramp(), 0.0, 1.0).is_err());
    }

    #[test]
    fn test_band_out_of_range_rejected() {
        let grid = make_grid(2, 2, vec![vec![1.0; 4]]);
        let err = render_palette(&grid, 3, None, &ramp(), 0.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("band 3"));
    }

    #[test]
    fn test_rgb_reads_three_bands_directly() {
        let grid = make_grid(
            2,
            1,
            vec![vec![10.0, 300.0], vec![20.0, -5.0], vec![30.0, 128.0]],
        );
        let img = render_rgb(&grid, None).unwrap();

        assert_eq!(img.pixel(0, 0), Some([10, 20, 30, 255]));
        // Channels clamp to [0, 255].
        assert_eq!(img.pixel(1, 0), Some([255, 0, 128, 255]));
    }

    #[test]
    fn test_rgb_requires_three_bands() {
        let grid = make_grid(2, 1, vec![vec![1.0, 2.0]]);
        assert!(render_rgb(&grid, None).is_err());
    }
}
