//! GeoTIFF decoding for solar data layers.
//!
//! A hand-rolled classic-TIFF reader sized for the small single-image
//! rasters the solar data provider serves: strip or tile chunking, chunky
//! or planar band organization, Deflate or uncompressed payloads, and
//! unsigned/signed/float samples widened to `f32` planes. Only the first
//! IFD is read; overview chains are ignored.

pub mod error;
pub mod geokeys;
pub mod ifd;
pub mod samples;
pub mod tags;

pub use error::{GeoTiffError, Result};
pub use samples::{ChunkLayout, RasterLayout};

use solar_common::{GridGeoref, RasterGrid, SolarResult};
use tracing::debug;

/// A decoded raster before grid construction.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub width: usize,
    pub height: usize,
    /// Row-major f32 planes, one per band.
    pub bands: Vec<Vec<f32>>,
    pub no_data: Option<f32>,
    /// Present when the container carried usable placement tags.
    pub georef: Option<GridGeoref>,
}

impl DecodedRaster {
    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Convert into a grid, substituting `default_georef` when the
    /// container carried no placement.
    pub fn into_grid(self, default_georef: GridGeoref) -> SolarResult<RasterGrid> {
        let georef = self.georef.unwrap_or(default_georef);
        RasterGrid::new(self.width, self.height, self.bands, self.no_data, georef)
    }
}

/// Decode a GeoTIFF payload into band planes plus geographic metadata.
pub fn decode(data: &[u8]) -> Result<DecodedRaster> {
    let header = ifd::parse_header(data)?;
    let dir = ifd::parse_ifd(header.byte_order, data, header.first_ifd_offset as usize)?;

    let layout = RasterLayout::from_ifd(&dir, data)?;
    let bands = samples::read_bands(&layout, data)?;
    let georef = geokeys::extract_georef(&dir, data, layout.width, layout.height)?;
    let no_data = geokeys::extract_no_data(&dir, data)?;

    debug!(
        width = layout.width,
        height = layout.height,
        bands = bands.len(),
        compression = layout.compression,
        georeferenced = georef.is_some(),
        "decoded raster"
    );

    Ok(DecodedRaster {
        width: layout.width,
        height: layout.height,
        bands,
        no_data,
        georef,
    })
}
