//! Decoding of bit-packed temporal shade rasters.
//!
//! Shade rasters store an integer bitfield in each f32 sample: bit
//! `day - 1` marks a day of the month and bit `hour` marks an hour of the
//! day. A pixel is shaded for a requested (day, hour) when both bits are
//! set in the sample. Samples are floats on the wire but carry integer
//! bitfields, so every decode truncates to an unsigned integer before any
//! bitwise work.

use rayon::prelude::*;
use solar_common::{RasterGrid, SolarError, SolarResult};
use tracing::debug;

pub const HOURS_PER_DAY: usize = 24;

/// A decoded shaded/lit grid. Cells are 1 (shaded) or 0 (lit), row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BinaryGrid {
    pub fn new(width: usize, height: usize, cells: Vec<u8>) -> SolarResult<Self> {
        if cells.len() != width * height {
            return Err(SolarError::decode(format!(
                "binary grid has {} cells, expected {} ({}x{})",
                cells.len(),
                width * height,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn shaded_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Shaded cells as a percentage of all cells; 0 for an empty grid.
    pub fn shade_percentage(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.shaded_count() as f32 / self.cells.len() as f32 * 100.0
    }
}

/// Decode the shaded/lit grid for one (day, hour) from band 0.
///
/// `day` is 1-based (1..=31), `hour` is 0-based (0..=23). No-data and
/// non-finite samples decode as lit. Values beyond the integer range of
/// the truncating cast saturate, which clears every mask bit and decodes
/// as lit.
pub fn decode(grid: &RasterGrid, day: u32, hour: u32) -> SolarResult<BinaryGrid> {
    if !(1..=31).contains(&day) {
        return Err(SolarError::insufficient_input(format!(
            "day {} outside 1..=31",
            day
        )));
    }
    if hour >= HOURS_PER_DAY as u32 {
        return Err(SolarError::insufficient_input(format!(
            "hour {} outside 0..=23",
            hour
        )));
    }
    let band = grid
        .band(0)
        .ok_or_else(|| SolarError::decode("shade raster has no bands".to_string()))?;

    let day_bit = 1u64 << (day - 1);
    let hour_bit = 1u64 << hour;
    let mask = day_bit | hour_bit;

    let cells = band
        .iter()
        .map(|&raw| {
            if !raw.is_finite() || grid.is_no_data(raw) {
                return 0;
            }
            // Explicit truncation: the sample is a float-encoded bitfield.
            let bits = raw.trunc() as u64;
            u8::from(bits & mask == mask)
        })
        .collect();

    let decoded = BinaryGrid {
        width: grid.width(),
        height: grid.height(),
        cells,
    };
    debug!(
        day,
        hour,
        shaded = decoded.shaded_count(),
        total = decoded.len(),
        "decoded shade mask"
    );
    Ok(decoded)
}

/// Decode all 24 hourly masks for one day.
///
/// Hours are independent, so the fan-out runs in parallel; the result is
/// ordered by hour.
pub fn decode_day(grid: &RasterGrid, day: u32) -> SolarResult<Vec<BinaryGrid>> {
    (0..HOURS_PER_DAY as u32)
        .into_par_iter()
        .map(|hour| decode(grid, day, hour))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{make_grid, make_grid_with_no_data};

    #[test]
    fn test_decode_requires_both_bits() {
        let raw = ((1u64 << 4) | (1u64 << 14)) as f32;
        let grid = make_grid(1, 1, vec![vec![raw]]);

        let shaded = decode(&grid, 5, 14).unwrap();
        assert_eq!(shaded.get(0, 0), Some(1));

        let lit = decode(&grid, 6, 14).unwrap();
        assert_eq!(lit.get(0, 0), Some(0));

        let wrong_hour = decode(&grid, 5, 13).unwrap();
        assert_eq!(wrong_hour.get(0, 0), Some(0));
    }

    #[test]
    fn test_decode_truncates_fractional_samples() {
        let raw = ((1u64 << 2) | (1u64 << 9)) as f32 + 0.9;
        let grid = make_grid(1, 1, vec![vec![raw]]);
        assert_eq!(decode(&grid, 3, 9).unwrap().get(0, 0), Some(1));
    }

    #[test]
    fn test_negative_and_nonfinite_samples_decode_lit() {
        let grid = make_grid(3, 1, vec![vec![-512.0, f32::NAN, f32::INFINITY]]);
        let decoded = decode(&grid, 1, 0).unwrap();
        assert_eq!(decoded.cells(), &[0, 0, 0]);
    }

    #[test]
    fn test_no_data_decodes_lit() {
        let all_bits = (u32::MAX >> 9) as f32; // bits 0..=22 set, exact in f32
        let grid = make_grid_with_no_data(2, 1, vec![vec![-9999.0, all_bits]], -9999.0);
        let decoded = decode(&grid, 4, 12).unwrap();
        assert_eq!(decoded.cells(), &[0, 1]);
    }

    #[test]
    fn test_day_and_hour_ranges_validated() {
        let grid = make_grid(1, 1, vec![vec![0.0]]);
        assert!(decode(&grid, 0, 0).is_err());
        assert!(decode(&grid, 32, 0).is_err());
        assert!(decode(&grid, 1, 24).is_err());
        assert!(decode(&grid, 31, 23).is_ok());
    }

    #[test]
    fn test_shade_percentage() {
        let grid = BinaryGrid::new(4, 1, vec![1, 1, 0, 0]).unwrap();
        assert_eq!(grid.shade_percentage(), 50.0);

        let empty = BinaryGrid::new(0, 0, Vec::new()).unwrap();
        assert_eq!(empty.shade_percentage(), 0.0);
    }

    #[test]
    fn test_binary_grid_rejects_mismatched_cells() {
        assert!(BinaryGrid::new(3, 2, vec![0; 5]).is_err());
    }

    #[test]
    fn test_decode_day_is_ordered_by_hour() {
        // Pixel shaded only for hour 7 of day 2.
        let raw = ((1u64 << 1) | (1u64 << 7)) as f32;
        let grid = make_grid(1, 1, vec![vec![raw]]);

        let hours = decode_day(&grid, 2).unwrap();
        assert_eq!(hours.len(), HOURS_PER_DAY);
        for (hour, mask) in hours.iter().enumerate() {
            // Hours 1 and 7 both test bits present in the sample.
            let expected = u8::from(hour == 7 || hour == 1);
            assert_eq!(mask.get(0, 0), Some(expected), "hour {}", hour);
        }
    }
}
