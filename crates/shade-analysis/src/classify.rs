//! Shade-source classification from extracted regions.
//!
//! Two stages. First a pure threshold function maps each region's shape
//! features onto a source kind with a fixed confidence. Then same-kind
//! sources whose centers sit close together are merged, because one
//! physical object produces slightly different region boundaries at
//! different sampled hours.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regions::{self, Region};
use crate::temporal::BinaryGrid;

/// Default jitter seed; callers wanting variation inject their own.
pub const DEFAULT_SEED: u64 = 42;

/// Same-kind sources closer than this (percent of frame width) collapse.
const MERGE_DISTANCE: f32 = 20.0;

/// Merged sources at or below this confidence are discarded.
const MIN_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadeSourceKind {
    Building,
    Tree,
    Terrain,
    Structure,
}

/// Shape features of one region, computed once before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFeatures {
    /// Bounding-box width over height.
    pub aspect_ratio: f32,
    /// Pixel count over bounding-box area.
    pub density: f32,
    /// Pixel count.
    pub area: f32,
}

impl RegionFeatures {
    pub fn from_region(region: &Region) -> Self {
        let width = region.bounds.width() as f32;
        let height = region.bounds.height() as f32;
        Self {
            aspect_ratio: width / height,
            density: region.area() as f32 / (width * height),
            area: region.area() as f32,
        }
    }
}

/// A detected shade-casting object in frame-percent coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadeSource {
    pub id: u32,
    pub kind: ShadeSourceKind,
    /// Center, percent of frame (0..=100 on each axis).
    pub position: (f32, f32),
    /// Width/height, percent of frame.
    pub size: (f32, f32),
    /// Meters, heuristic.
    pub estimated_height: f32,
    /// In (0, 1]; derived from the matched rule, never hand-tuned.
    pub confidence: f32,
}

/// Threshold classifier with seeded height jitter.
pub struct ShadeClassifier {
    rng: StdRng,
}

impl Default for ShadeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadeClassifier {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Jitter is the only nondeterminism; the same seed and the same input
    /// order reproduce identical output.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stage 1: rule table over shape features.
    ///
    /// Rules are evaluated in order; the first match wins. Returns
    /// (kind, confidence, estimated height in meters).
    pub fn classify_features(&mut self, f: &RegionFeatures) -> (ShadeSourceKind, f32, f32) {
        if (0.7..=1.3).contains(&f.aspect_ratio) && f.density > 0.8 {
            // Compact and solid: roofline of a neighboring building.
            let height = 15.0 + f.area / 100.0 * 10.0;
            (ShadeSourceKind::Building, 0.9, height)
        } else if f.density < 0.6 && f.area > 50.0 {
            // Large but sparse: canopy.
            let height = 20.0 + self.rng.gen_range(0.0..30.0);
            (ShadeSourceKind::Tree, 0.8, height)
        } else if f.aspect_ratio > 2.0 {
            // Much wider than tall: a terrain ridge.
            let height = 5.0 + self.rng.gen_range(0.0..10.0);
            (ShadeSourceKind::Terrain, 0.6, height)
        } else {
            (ShadeSourceKind::Structure, 0.7, 10.0)
        }
    }

    /// Classify regions into sources positioned in frame-percent units.
    pub fn classify_regions(
        &mut self,
        regions: &[Region],
        frame_width: usize,
        frame_height: usize,
    ) -> Vec<ShadeSource> {
        if frame_width == 0 || frame_height == 0 {
            return Vec::new();
        }
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        regions
            .iter()
            .enumerate()
            .map(|(i, region)| {
                let features = RegionFeatures::from_region(region);
                let (kind, confidence, estimated_height) = self.classify_features(&features);
                ShadeSource {
                    id: i as u32,
                    kind,
                    position: (
                        region.center.0 / fw * 100.0,
                        region.center.1 / fh * 100.0,
                    ),
                    size: (
                        region.bounds.width() as f32 / fw * 100.0,
                        region.bounds.height() as f32 / fh * 100.0,
                    ),
                    estimated_height,
                    confidence,
                }
            })
            .collect()
    }

    /// Full pipeline over the union of hourly masks: extract regions per
    /// hour, classify them all, then merge duplicates across hours.
    pub fn detect_shade_sources(
        &mut self,
        hourly_masks: &[BinaryGrid],
        min_region_size: usize,
    ) -> Vec<ShadeSource> {
        let mut candidates = Vec::new();
        for mask in hourly_masks {
            let regions = regions::extract(mask, min_region_size);
            candidates.extend(self.classify_regions(&regions, mask.width(), mask.height()));
        }
        debug!(
            hours = hourly_masks.len(),
            candidates = candidates.len(),
            "classified shade-source candidates"
        );
        merge_sources(candidates)
    }
}

/// Stage 2: collapse same-kind sources with nearby centers, then filter.
///
/// Merge passes repeat until no pass collapses anything, so running the
/// merge on already-merged output changes nothing. On each collapse the
/// group's position, size, height, and confidence are averaged. Survivors
/// must exceed the confidence gate and get fresh sequential ids.
pub fn merge_sources(sources: Vec<ShadeSource>) -> Vec<ShadeSource> {
    let mut current = sources;
    loop {
        let before = current.len();
        current = merge_pass(current);
        if current.len() == before {
            break;
        }
    }

    current.retain(|s| s.confidence > MIN_CONFIDENCE);
    for (i, source) in current.iter_mut().enumerate() {
        source.id = i as u32;
    }
    current
}

fn merge_pass(sources: Vec<ShadeSource>) -> Vec<ShadeSource> {
    let mut used = vec![false; sources.len()];
    let mut out = Vec::with_capacity(sources.len());

    for i in 0..sources.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut group = vec![&sources[i]];

        for j in (i + 1)..sources.len() {
            if used[j] || sources[j].kind != sources[i].kind {
                continue;
            }
            if center_distance(&sources[i], &sources[j]) < MERGE_DISTANCE {
                used[j] = true;
                group.push(&sources[j]);
            }
        }

        out.push(average_group(&group));
    }

    out
}

fn center_distance(a: &ShadeSource, b: &ShadeSource) -> f32 {
    let dx = a.position.0 - b.position.0;
    let dy = a.position.1 - b.position.1;
    (dx * dx + dy * dy).sqrt()
}

fn average_group(group: &[&ShadeSource]) -> ShadeSource {
    let n = group.len() as f32;
    let sum = |f: fn(&ShadeSource) -> f32| group.iter().map(|s| f(s)).sum::<f32>() / n;

    ShadeSource {
        id: group[0].id,
        kind: group[0].kind,
        position: (sum(|s| s.position.0), sum(|s| s.position.1)),
        size: (sum(|s| s.size.0), sum(|s| s.size.1)),
        estimated_height: sum(|s| s.estimated_height),
        confidence: sum(|s| s.confidence),
    }
}
