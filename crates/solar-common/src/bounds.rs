//! Geographic bounds for roof-scale rasters.

use serde::{Deserialize, Serialize};

/// Geographic extent of a raster in degrees.
///
/// Rasters here cover a single building and its immediate surroundings, so
/// spans are small and antimeridian wrapping is not handled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Create bounds from compass-edge coordinates.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// East-west span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Midpoint as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Check whether a point lies within the bounds (edges inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat <= self.north && lat >= self.south && lng >= self.west && lng <= self.east
    }

    /// Check whether two bounds overlap with positive area.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_and_center() {
        let bounds = GeoBounds::new(37.48, 37.42, -122.10, -122.20);
        assert!((bounds.width() - 0.10).abs() < 1e-9);
        assert!((bounds.height() - 0.06).abs() < 1e-9);

        let (lat, lng) = bounds.center();
        assert!((lat - 37.45).abs() < 1e-9);
        assert!((lng - (-122.15)).abs() < 1e-9);
    }

    #[test]
    fn test_contains() {
        let bounds = GeoBounds::new(10.0, 0.0, 20.0, 0.0);
        assert!(bounds.contains(5.0, 10.0));
        assert!(bounds.contains(10.0, 20.0));
        assert!(!bounds.contains(10.5, 10.0));
        assert!(!bounds.contains(5.0, -0.5));
    }

    #[test]
    fn test_intersects() {
        let bounds = GeoBounds::new(10.0, 0.0, 20.0, 0.0);
        let overlapping = GeoBounds::new(15.0, 5.0, 30.0, 10.0);
        let disjoint = GeoBounds::new(10.0, 0.0, 45.0, 25.0);
        let touching = GeoBounds::new(10.0, 0.0, 40.0, 20.0);

        assert!(bounds.intersects(&overlapping));
        assert!(overlapping.intersects(&bounds));
        assert!(!bounds.intersects(&disjoint));
        // Shared edges have zero overlap area.
        assert!(!bounds.intersects(&touching));
    }
}
