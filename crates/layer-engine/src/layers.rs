//! Layer identities and availability.

use serde::{Deserialize, Serialize};

use solar_common::DataLayerUrls;

/// The data layers a building-insights response can carry.
///
/// Ids mirror the upstream camelCase naming so callers can pass provider
/// layer names straight through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Mask,
    Dsm,
    Rgb,
    AnnualFlux,
    MonthlyFlux,
    HourlyShade,
}

impl LayerKind {
    pub const ALL: [LayerKind; 6] = [
        LayerKind::Mask,
        LayerKind::Dsm,
        LayerKind::Rgb,
        LayerKind::AnnualFlux,
        LayerKind::MonthlyFlux,
        LayerKind::HourlyShade,
    ];

    /// Stable string id, also the serde representation.
    pub fn id(&self) -> &'static str {
        match self {
            LayerKind::Mask => "mask",
            LayerKind::Dsm => "dsm",
            LayerKind::Rgb => "rgb",
            LayerKind::AnnualFlux => "annualFlux",
            LayerKind::MonthlyFlux => "monthlyFlux",
            LayerKind::HourlyShade => "hourlyShade",
        }
    }

    /// Human-readable label for legends and layer pickers.
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Mask => "Roof mask",
            LayerKind::Dsm => "Surface elevation",
            LayerKind::Rgb => "Aerial image",
            LayerKind::AnnualFlux => "Annual sunshine",
            LayerKind::MonthlyFlux => "Monthly sunshine",
            LayerKind::HourlyShade => "Hourly shade",
        }
    }

    /// Look up a kind by its string id.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// URL for this layer in `urls`, if the provider supplied one.
    ///
    /// `month` (1-based) selects among the hourly-shade URLs and is ignored
    /// for every other kind.
    pub fn url<'a>(&self, urls: &'a DataLayerUrls, month: u32) -> Option<&'a str> {
        match self {
            LayerKind::Mask => urls.mask_url.as_deref(),
            LayerKind::Dsm => urls.dsm_url.as_deref(),
            LayerKind::Rgb => urls.rgb_url.as_deref(),
            LayerKind::AnnualFlux => urls.annual_flux_url.as_deref(),
            LayerKind::MonthlyFlux => urls.monthly_flux_url.as_deref(),
            LayerKind::HourlyShade => urls.hourly_shade_url(month),
        }
    }
}

/// Availability of one layer id under the current URL set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    pub id: String,
    pub label: String,
    pub available: bool,
}
