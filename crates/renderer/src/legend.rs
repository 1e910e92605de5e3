//! Legend records attached to rendered layers.

use serde::{Deserialize, Serialize};

use crate::palette::Palette;

/// Ordered color stops plus textual range labels for a rendered layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub title: String,
    /// Stop colors as `#RRGGBB`, low value first.
    pub colors: Vec<String>,
    pub min_label: String,
    pub max_label: String,
}

impl Legend {
    /// Describe `palette` over the value range `min..=max`.
    ///
    /// `unit` is appended to the labels when non-empty.
    pub fn from_palette(
        title: impl Into<String>,
        palette: &Palette,
        min: f32,
        max: f32,
        unit: &str,
    ) -> Self {
        Self {
            title: title.into(),
            colors: palette.colors().iter().map(|c| c.to_hex()).collect(),
            min_label: format_label(min, unit),
            max_label: format_label(max, unit),
        }
    }
}

fn format_label(value: f32, unit: &str) -> String {
    // Whole values print without a decimal tail ("1800 kWh/kW" not "1800.0").
    let number = if value.fract() == 0.0 && value.abs() < 1.0e7 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    };
    if unit.is_empty() {
        number
    } else {
        format!("{} {}", number, unit)
    }
}
