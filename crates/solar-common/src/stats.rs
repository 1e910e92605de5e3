//! Summary statistics over raster bands.

use serde::Serialize;

/// Min/max/mean/std summary for one raster band.
///
/// Only valid samples participate: no-data sentinels and non-finite values
/// are skipped. With zero valid samples every field is zero, so callers can
/// scale palettes without checking for NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    /// Population standard deviation (divide by N).
    pub std: f32,
    /// Number of valid samples.
    pub count: usize,
}

impl BandStatistics {
    /// The all-zero summary used for bands with no valid samples.
    pub fn zero() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
            count: 0,
        }
    }

    /// Compute statistics over `samples`, skipping the no-data sentinel and
    /// non-finite values. Accumulates in f64 to keep the variance stable on
    /// large rasters.
    pub fn compute(samples: &[f32], no_data: Option<f32>) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut count = 0usize;

        for &v in samples {
            if !v.is_finite() {
                continue;
            }
            if let Some(nd) = no_data {
                if v == nd {
                    continue;
                }
            }

            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
            sum_sq += (v as f64) * (v as f64);
            count += 1;
        }

        if count == 0 {
            return Self::zero();
        }

        let n = count as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);

        Self {
            min,
            max,
            mean: mean as f32,
            std: variance.sqrt() as f32,
            count,
        }
    }
}
