//! Integration tests for palette and true-color rendering.

use renderer::{render_palette, render_rgb, Legend, Palette};
use test_utils::{create_binary_grid, create_flux_grid, make_grid, make_grid_with_no_data};

// ============================================================================
// render_palette tests
// ============================================================================

#[test]
fn test_palette_output_is_bounded_rgba() {
    let width = 16;
    let height = 16;
    let flux = create_flux_grid(width, height, 400.0, 1800.0);
    let grid = make_grid(width, height, vec![flux]);

    let img = render_palette(&grid, 0, None, Palette::iron(), 400.0, 1800.0).unwrap();

    assert_eq!(img.pixels.len(), width * height * 4);
    for px in img.pixels.chunks_exact(4) {
        // u8 channels are bounded by construction; the meaningful assertion
        // is that every pixel of an unmasked finite grid is opaque.
        assert_eq!(px[3], 255);
    }
}

#[test]
fn test_masked_and_no_data_pixels_have_zero_alpha() {
    let width = 8;
    let height = 8;
    let mut samples = create_flux_grid(width, height, 0.0, 100.0);
    samples[0] = -9999.0; // no-data corner
    let grid = make_grid_with_no_data(width, height, vec![samples], -9999.0);

    // Mask covers the right half only.
    let mask = make_grid(
        width,
        height,
        vec![create_binary_grid(width, height, &[(4, 0, 4, 8)])],
    );

    let img = render_palette(&grid, 0, Some(&mask), Palette::iron(), 0.0, 100.0).unwrap();

    // No-data pixel transparent even though inside the frame.
    assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
    for y in 0..height {
        for x in 0..width {
            let alpha = img.pixel(x, y).map(|p| p[3]);
            if x < 4 {
                assert_eq!(alpha, Some(0), "masked-out pixel ({}, {})", x, y);
            } else {
                assert_eq!(alpha, Some(255), "roof pixel ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_higher_values_move_along_the_ramp() {
    let grid = make_grid(3, 1, vec![vec![0.0, 50.0, 100.0]]);
    let img = render_palette(&grid, 0, None, Palette::sunlight(), 0.0, 100.0).unwrap();

    let low = img.pixel(0, 0).unwrap();
    let mid = img.pixel(1, 0).unwrap();
    let high = img.pixel(2, 0).unwrap();

    // sunlight runs dark gray to amber, so red rises monotonically.
    assert!(low[0] < mid[0]);
    assert!(mid[0] < high[0]);
    assert_eq!(high[0], 0xFF);
    assert_eq!(high[1], 0xCA);
}

// ============================================================================
// render_rgb tests
// ============================================================================

#[test]
fn test_true_color_end_to_end() {
    let width = 4;
    let height = 4;
    let red: Vec<f32> = (0..16).map(|i| (i * 20) as f32).collect();
    let green: Vec<f32> = (0..16).map(|i| (i * 10) as f32).collect();
    let blue: Vec<f32> = (0..16).map(|i| 300.0 - (i as f32)).collect();
    let grid = make_grid(width, height, vec![red.clone(), green.clone(), blue.clone()]);
    let mask = make_grid(width, height, vec![vec![1.0; 16]]);

    let img = render_rgb(&grid, Some(&mask)).unwrap();

    assert_eq!(img.width, 4);
    assert_eq!(img.height, 4);
    assert_eq!(img.pixels.len(), 4 * 4 * 4);

    let px = img.pixel(0, 0).unwrap();
    assert_eq!(px[0], red[0].clamp(0.0, 255.0) as u8);
    assert_eq!(px[1], green[0].clamp(0.0, 255.0) as u8);
    assert_eq!(px[2], blue[0].clamp(0.0, 255.0) as u8);
    assert_eq!(px[3], 255);

    // blue[0] = 300 exceeds the channel range and must clamp.
    assert_eq!(px[2], 255);
}

#[test]
fn test_rgb_respects_mask() {
    let grid = make_grid(2, 2, vec![vec![9.0; 4], vec![9.0; 4], vec![9.0; 4]]);
    let mask = make_grid(2, 2, vec![vec![1.0, 0.0, 0.0, 1.0]]);

    let img = render_rgb(&grid, Some(&mask)).unwrap();

    assert_eq!(img.pixel(0, 0).map(|p| p[3]), Some(255));
    assert_eq!(img.pixel(1, 0).map(|p| p[3]), Some(0));
    assert_eq!(img.pixel(0, 1).map(|p| p[3]), Some(0));
    assert_eq!(img.pixel(1, 1).map(|p| p[3]), Some(255));
}

// ============================================================================
// Legend tests
// ============================================================================

#[test]
fn test_legend_round_trips_through_json() {
    let legend = Legend::from_palette("Annual flux", Palette::iron(), 500.0, 1900.0, "kWh/kW");
    let json = serde_json::to_string(&legend).unwrap();
    let back: Legend = serde_json::from_str(&json).unwrap();
    assert_eq!(back, legend);
    assert_eq!(back.colors.len(), Palette::iron().len());
}
