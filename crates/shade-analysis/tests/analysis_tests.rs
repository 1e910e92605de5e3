//! Integration tests for the decode → extract → classify pipeline.

use std::collections::HashSet;

use shade_analysis::{
    decode, decode_day, extract, BinaryGrid, Region, ShadeClassifier, ShadeSourceKind,
    DEFAULT_MIN_REGION_SIZE,
};
use test_utils::{create_shade_mask_grid, make_grid};

/// Every member pixel must be reachable from the first pixel through
/// 4-connected member pixels.
fn assert_region_connected(region: &Region) {
    let members: HashSet<(u32, u32)> = region.pixels.iter().copied().collect();
    assert_eq!(members.len(), region.pixels.len(), "duplicate pixels");

    let start = region.pixels[0];
    let mut seen: HashSet<(u32, u32)> = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for p in neighbors {
            if members.contains(&p) && seen.insert(p) {
                stack.push(p);
            }
        }
    }
    assert_eq!(
        seen.len(),
        members.len(),
        "region contains pixels unreachable from {:?}",
        start
    );
}

// ============================================================================
// Temporal decode + region extraction
// ============================================================================

#[test]
fn test_shade_pipeline_extracts_the_shaded_rect() {
    let width = 32;
    let height = 32;
    // One 12x12 shaded block encoded for day 15, hour 10.
    let samples = create_shade_mask_grid(width, height, &[(8, 8, 12, 12)], 15, 10);
    let grid = make_grid(width, height, vec![samples]);

    let mask = decode(&grid, 15, 10).unwrap();
    assert_eq!(mask.shaded_count(), 144);

    let regions = extract(&mask, DEFAULT_MIN_REGION_SIZE);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area(), 144);
    assert_eq!(regions[0].bounds.min_x, 8);
    assert_eq!(regions[0].bounds.max_y, 19);

    // A different day decodes fully lit.
    let other_day = decode(&grid, 16, 10).unwrap();
    assert_eq!(other_day.shaded_count(), 0);
    assert!(extract(&other_day, DEFAULT_MIN_REGION_SIZE).is_empty());
}

#[test]
fn test_every_region_is_internally_connected() {
    // Scattered blocks plus an irregular blob.
    let mut cells = vec![0u8; 64 * 64];
    for y in 4..20 {
        for x in 4..20 {
            cells[y * 64 + x] = 1;
        }
    }
    for y in 30..38 {
        for x in 40..60 {
            cells[y * 64 + x] = 1;
        }
    }
    // A snaking one-pixel-wide appendage attached to the second block.
    for y in 38..50 {
        cells[y * 64 + 40] = 1;
    }
    let grid = BinaryGrid::new(64, 64, cells).unwrap();

    let regions = extract(&grid, 1);
    assert_eq!(regions.len(), 2);
    for region in &regions {
        assert_region_connected(region);
    }
}

#[test]
fn test_decode_day_matches_individual_decodes() {
    let width = 16;
    let height = 16;
    let samples = create_shade_mask_grid(width, height, &[(2, 2, 6, 6)], 15, 9);
    let grid = make_grid(width, height, vec![samples]);

    let all = decode_day(&grid, 15).unwrap();
    for hour in 0..24 {
        let single = decode(&grid, 15, hour as u32).unwrap();
        assert_eq!(all[hour], single, "hour {}", hour);
    }
}

// ============================================================================
// End-to-end shade-source detection
// ============================================================================

#[test]
fn test_detect_collapses_duplicates_across_hours() {
    let width = 50;
    let height = 50;

    // The same physical blocker shows up slightly shifted in two hours.
    let hour_a = {
        let samples = create_shade_mask_grid(width, height, &[(10, 10, 12, 12)], 15, 9);
        let grid = make_grid(width, height, vec![samples]);
        decode(&grid, 15, 9).unwrap()
    };
    let hour_b = {
        let samples = create_shade_mask_grid(width, height, &[(12, 10, 12, 12)], 15, 10);
        let grid = make_grid(width, height, vec![samples]);
        decode(&grid, 15, 10).unwrap()
    };

    let mut classifier = ShadeClassifier::with_seed(1);
    let sources = classifier.detect_shade_sources(&[hour_a, hour_b], DEFAULT_MIN_REGION_SIZE);

    // Solid square blocks classify as buildings; the two near-identical
    // detections collapse into one.
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].kind, ShadeSourceKind::Building);
    assert_eq!(sources[0].id, 0);
    assert!(sources[0].confidence > 0.6);
}

#[test]
fn test_detect_on_fully_lit_masks_finds_nothing() {
    let lit = BinaryGrid::new(20, 20, vec![0; 400]).unwrap();
    let mut classifier = ShadeClassifier::new();
    let sources = classifier.detect_shade_sources(&[lit], DEFAULT_MIN_REGION_SIZE);
    assert!(sources.is_empty());
}
