//! Upstream building-insights payloads.
//!
//! These records mirror the JSON shape of the solar data provider's
//! building-insights and data-layers endpoints. They are inputs to the
//! layer engine; nothing in this workspace produces them.

use serde::{Deserialize, Serialize};

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Building-insights record for one rooftop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInsights {
    #[serde(default)]
    pub name: Option<String>,
    pub center: LatLng,
    #[serde(default)]
    pub solar_potential: Option<SolarPotential>,
}

/// Roof-level solar summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPotential {
    #[serde(default)]
    pub max_sunshine_hours_per_year: Option<f64>,
    #[serde(default)]
    pub roof_segment_stats: Vec<RoofSegment>,
}

/// One planar roof segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofSegment {
    pub pitch_degrees: f64,
    pub azimuth_degrees: f64,
    pub stats: SizeAndSunshineStats,
    #[serde(default)]
    pub center: Option<LatLng>,
    #[serde(default)]
    pub plane_height_at_center_meters: Option<f64>,
}

/// Area and sunshine distribution for a roof segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeAndSunshineStats {
    pub area_meters2: f64,
    /// Sunshine hours per year at evenly spaced quantiles of the segment.
    #[serde(default)]
    pub sunshine_quantiles: Vec<f64>,
    #[serde(default)]
    pub ground_area_meters2: Option<f64>,
}

/// The named raster URL set accompanying a building-insights response.
///
/// `hourly_shade_urls` carries one URL per month, January first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLayerUrls {
    #[serde(default)]
    pub mask_url: Option<String>,
    #[serde(default)]
    pub dsm_url: Option<String>,
    #[serde(default)]
    pub rgb_url: Option<String>,
    #[serde(default)]
    pub annual_flux_url: Option<String>,
    #[serde(default)]
    pub monthly_flux_url: Option<String>,
    #[serde(default)]
    pub hourly_shade_urls: Vec<String>,
}

impl DataLayerUrls {
    /// Hourly-shade URL for a 1-based month, when the provider supplied one.
    pub fn hourly_shade_url(&self, month: u32) -> Option<&str> {
        if month == 0 {
            return None;
        }
        self.hourly_shade_urls
            .get((month - 1) as usize)
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_insights_from_camel_case_json() {
        let json = r#"{
            "name": "buildings/abc123",
            "center": { "latitude": 37.45, "longitude": -122.18 },
            "solarPotential": {
                "maxSunshineHoursPerYear": 1830.5,
                "roofSegmentStats": [
                    {
                        "pitchDegrees": 22.5,
                        "azimuthDegrees": 180.0,
                        "stats": {
                            "areaMeters2": 48.2,
                            "sunshineQuantiles": [500.0, 1200.0, 1800.0],
                            "groundAreaMeters2": 44.6
                        },
                        "planeHeightAtCenterMeters": 6.1
                    }
                ]
            }
        }"#;

        let insights: BuildingInsights = serde_json::from_str(json).unwrap();
        assert_eq!(insights.center.latitude, 37.45);

        let potential = insights.solar_potential.unwrap();
        assert_eq!(potential.roof_segment_stats.len(), 1);
        let segment = &potential.roof_segment_stats[0];
        assert_eq!(segment.pitch_degrees, 22.5);
        assert_eq!(segment.stats.sunshine_quantiles.len(), 3);
    }

    #[test]
    fn test_hourly_shade_url_indexing() {
        let urls = DataLayerUrls {
            hourly_shade_urls: vec!["jan".to_string(), "feb".to_string()],
            ..Default::default()
        };
        assert_eq!(urls.hourly_shade_url(1), Some("jan"));
        assert_eq!(urls.hourly_shade_url(2), Some("feb"));
        assert_eq!(urls.hourly_shade_url(3), None);
        assert_eq!(urls.hourly_shade_url(0), None);
    }

    #[test]
    fn test_missing_optional_fields_tolerated() {
        let json = r#"{ "center": { "latitude": 1.0, "longitude": 2.0 } }"#;
        let insights: BuildingInsights = serde_json::from_str(json).unwrap();
        assert!(insights.name.is_none());
        assert!(insights.solar_potential.is_none());
    }
}
