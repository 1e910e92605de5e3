//! Geographic metadata extraction.
//!
//! Placement comes from ModelPixelScale + ModelTiepoint, the CRS code from
//! the GeoKeyDirectory, and the no-data sentinel from GDAL's ASCII tag.
//! Everything here is best-effort: rasters without these tags still decode,
//! they just carry no georeferencing.

use solar_common::{GeoBounds, GridGeoref};

use crate::error::Result;
use crate::ifd::Ifd;
use crate::tags::{self, geo_keys};

/// Derive the grid's placement from the GeoTIFF tags, when present.
pub fn extract_georef(ifd: &Ifd, data: &[u8], width: usize, height: usize) -> Result<Option<GridGeoref>> {
    let scale = match ifd.f64_values(tags::MODEL_PIXEL_SCALE, data)? {
        Some(s) if s.len() >= 2 => s,
        _ => return Ok(None),
    };
    let tiepoint = match ifd.f64_values(tags::MODEL_TIEPOINT, data)? {
        Some(t) if t.len() >= 6 => t,
        _ => return Ok(None),
    };

    // Tiepoint maps raster (i, j) to model (x, y); the usual anchor is
    // pixel (0, 0) but the general form is handled.
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    let pixel_scale = (scale[0], -scale[1]);

    let far_x = origin_x + width as f64 * pixel_scale.0;
    let far_y = origin_y + height as f64 * pixel_scale.1;
    let bounds = GeoBounds {
        north: origin_y.max(far_y),
        south: origin_y.min(far_y),
        east: origin_x.max(far_x),
        west: origin_x.min(far_x),
    };

    Ok(Some(GridGeoref {
        bounds,
        pixel_scale,
        origin: (origin_x, origin_y),
        epsg: extract_epsg(ifd, data)?,
    }))
}

/// Pull an EPSG code out of the GeoKeyDirectory. Projected CRS wins over
/// geographic when both keys are present; user-defined (32767) is ignored.
fn extract_epsg(ifd: &Ifd, data: &[u8]) -> Result<Option<u16>> {
    let directory = match ifd.u32_values(tags::GEO_KEY_DIRECTORY, data)? {
        Some(d) if d.len() >= 4 => d,
        _ => return Ok(None),
    };

    // Header: version, revision, minor, key count. Keys follow as
    // (id, tag location, count, value) quadruples; location 0 means the
    // value is stored inline in the quadruple.
    let key_count = directory[3] as usize;
    let mut geographic = None;
    let mut projected = None;

    for i in 0..key_count {
        let base = 4 + i * 4;
        if base + 4 > directory.len() {
            break;
        }
        let key_id = directory[base] as u16;
        let location = directory[base + 1];
        let value = directory[base + 3];

        if location != 0 || value == 32767 || value == 0 || value > u16::MAX as u32 {
            continue;
        }
        match key_id {
            geo_keys::GEOGRAPHIC_TYPE => geographic = Some(value as u16),
            geo_keys::PROJECTED_CS_TYPE => projected = Some(value as u16),
            _ => {}
        }
    }

    Ok(projected.or(geographic))
}

/// Parse the GDAL no-data sentinel. The tag is ASCII; "nan" parses to NaN.
pub fn extract_no_data(ifd: &Ifd, data: &[u8]) -> Result<Option<f32>> {
    let text = match ifd.ascii_value(tags::GDAL_NODATA, data)? {
        Some(t) => t,
        None => return Ok(None),
    };
    Ok(text.trim().parse::<f32>().ok())
}
