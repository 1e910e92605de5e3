//! Decoded multi-band rasters.

use crate::{BandStatistics, GeoBounds, SolarError, SolarResult};

/// Georeferencing metadata shared by decoded and synthetic rasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeoref {
    /// Geographic extent of the raster.
    pub bounds: GeoBounds,
    /// Ground units per pixel in (x, y). The y component is typically
    /// negative: north-up rasters step southward per row.
    pub pixel_scale: (f64, f64),
    /// Geographic coordinate of pixel (0, 0) (x = longitude-like, y = latitude-like).
    pub origin: (f64, f64),
    /// Best-effort coordinate reference system, when the source declared one.
    pub epsg: Option<u16>,
}

/// A multi-band raster with geographic placement.
///
/// Bands are row-major `f32` planes, each exactly `width * height` samples
/// long. The grid is immutable after construction; callers share decoded
/// grids behind `Arc` and never mutate them.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    bands: Vec<Vec<f32>>,
    /// Sentinel marking samples to treat as absent, when the source declared one.
    pub no_data: Option<f32>,
    pub georef: GridGeoref,
}

impl RasterGrid {
    /// Build a grid, validating that every band has `width * height` samples.
    pub fn new(
        width: usize,
        height: usize,
        bands: Vec<Vec<f32>>,
        no_data: Option<f32>,
        georef: GridGeoref,
    ) -> SolarResult<Self> {
        let expected = width * height;
        for (i, band) in bands.iter().enumerate() {
            if band.len() != expected {
                return Err(SolarError::Decode(format!(
                    "band {} has {} samples, expected {} ({}x{})",
                    i,
                    band.len(),
                    expected,
                    width,
                    height
                )));
            }
        }

        Ok(Self {
            width,
            height,
            bands,
            no_data,
            georef,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per band.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True for degenerate zero-area grids.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Borrow one band's samples.
    pub fn band(&self, index: usize) -> Option<&[f32]> {
        self.bands.get(index).map(|b| b.as_slice())
    }

    /// Read a single sample.
    pub fn sample(&self, band: usize, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bands.get(band).map(|b| b[self.flat_index(x, y)])
    }

    /// Row-major flat index for a pixel position.
    pub fn flat_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether a sample matches the grid's no-data sentinel.
    ///
    /// A NaN sentinel matches NaN samples even though `NaN != NaN`.
    pub fn is_no_data(&self, value: f32) -> bool {
        match self.no_data {
            Some(nd) => value == nd || (nd.is_nan() && value.is_nan()),
            None => false,
        }
    }

    /// Summary statistics for one band, skipping no-data and non-finite samples.
    pub fn band_statistics(&self, band: usize) -> Option<BandStatistics> {
        self.band(band)
            .map(|samples| BandStatistics::compute(samples, self.no_data))
    }

    /// Convert a geographic coordinate to the nearest pixel, if inside the grid.
    ///
    /// Best-effort linear transform from the origin and pixel scale; no
    /// datum or projection handling beyond what the source metadata encodes.
    pub fn latlng_to_pixel(&self, lat: f64, lng: f64) -> Option<(usize, usize)> {
        let (sx, sy) = self.georef.pixel_scale;
        if sx == 0.0 || sy == 0.0 {
            return None;
        }

        let col = ((lng - self.georef.origin.0) / sx).round() as isize;
        let row = ((lat - self.georef.origin.1) / sy).round() as isize;

        if col < 0 || row < 0 || col >= self.width as isize || row >= self.height as isize {
            return None;
        }

        Some((col as usize, row as usize))
    }

    /// Convert a pixel position to its geographic coordinate as (lat, lng).
    pub fn pixel_to_latlng(&self, x: usize, y: usize) -> (f64, f64) {
        let (sx, sy) = self.georef.pixel_scale;
        let lng = self.georef.origin.0 + x as f64 * sx;
        let lat = self.georef.origin.1 + y as f64 * sy;
        (lat, lng)
    }
}
