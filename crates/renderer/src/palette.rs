//! Ordered color ramps for scalar raster layers.
//!
//! A palette is a list of RGB stops spaced evenly over [0, 1]. Sampling
//! interpolates linearly between the two nearest stops. The built-in
//! ramps match the conventional solar-layer styling: a binary roof mask,
//! a rainbow elevation ramp, an iron flux ramp, and a dark-to-amber
//! sunlight ramp for shaded-hour counts.

use once_cell::sync::Lazy;
use solar_common::{SolarError, SolarResult};

use crate::color::{hex_to_rgb, interpolate_color, Color};

const BINARY_STOPS: &[&str] = &["212121", "EEEEEE"];
const RAINBOW_STOPS: &[&str] = &["3949AB", "81D4FA", "66BB6A", "FFE082", "E53935"];
const IRON_STOPS: &[&str] = &["00000A", "91009C", "E64616", "FEB400", "FFFFF6"];
const SUNLIGHT_STOPS: &[&str] = &["212121", "FFCA28"];

static BINARY: Lazy<Palette> = Lazy::new(|| Palette::from_known("binary", BINARY_STOPS));
static RAINBOW: Lazy<Palette> = Lazy::new(|| Palette::from_known("rainbow", RAINBOW_STOPS));
static IRON: Lazy<Palette> = Lazy::new(|| Palette::from_known("iron", IRON_STOPS));
static SUNLIGHT: Lazy<Palette> = Lazy::new(|| Palette::from_known("sunlight", SUNLIGHT_STOPS));

/// An ordered, non-empty list of color stops.
#[derive(Debug, Clone)]
pub struct Palette {
    name: String,
    colors: Vec<Color>,
}

impl Palette {
    /// Build a palette from hex stop strings (`#RRGGBB` or `RRGGBB`).
    pub fn from_hex(name: impl Into<String>, stops: &[&str]) -> SolarResult<Self> {
        let name = name.into();
        let mut colors = Vec::with_capacity(stops.len());
        for stop in stops {
            let (r, g, b) = hex_to_rgb(stop).ok_or_else(|| {
                SolarError::render(format!("palette '{}': invalid color stop '{}'", name, stop))
            })?;
            colors.push(Color::opaque(r, g, b));
        }
        Self::from_colors(name, colors)
    }

    pub fn from_colors(name: impl Into<String>, colors: Vec<Color>) -> SolarResult<Self> {
        let name = name.into();
        if colors.is_empty() {
            return Err(SolarError::render(format!(
                "palette '{}' has no color stops",
                name
            )));
        }
        Ok(Self { name, colors })
    }

    /// Constructor for the compiled-in stop tables. Unparseable stops fall
    /// back to gray; the built-in tables are asserted exact in tests.
    fn from_known(name: &str, stops: &[&str]) -> Self {
        let colors = stops
            .iter()
            .map(|s| match hex_to_rgb(s) {
                Some((r, g, b)) => Color::opaque(r, g, b),
                None => Color::opaque(200, 200, 200),
            })
            .collect();
        Self {
            name: name.to_string(),
            colors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Sample the ramp at `t` in [0, 1] (clamped).
    ///
    /// With N stops the input is scaled to `t * (N-1)`; the fractional part
    /// interpolates between the two surrounding stops. A single-stop palette
    /// returns that color for every input.
    pub fn sample(&self, t: f32) -> Color {
        let n = self.colors.len();
        if n == 1 {
            return self.colors[0];
        }

        let t = t.clamp(0.0, 1.0);
        let scaled = t * (n - 1) as f32;
        let low = (scaled.floor() as usize).min(n - 2);
        let frac = scaled - low as f32;
        interpolate_color(self.colors[low], self.colors[low + 1], frac)
    }

    /// Dark-to-light two-stop ramp for binary masks.
    pub fn binary() -> &'static Palette {
        &BINARY
    }

    /// Blue-to-red elevation ramp.
    pub fn rainbow() -> &'static Palette {
        &RAINBOW
    }

    /// Black-body style ramp for solar flux.
    pub fn iron() -> &'static Palette {
        &IRON
    }

    /// Dark-to-amber ramp for shaded-hour counts.
    pub fn sunlight() -> &'static Palette {
        &SUNLIGHT
    }

    /// Look up a built-in ramp by name.
    pub fn builtin(name: &str) -> Option<&'static Palette> {
        match name {
            "binary" => Some(Self::binary()),
            "rainbow" => Some(Self::rainbow()),
            "iron" => Some(Self::iron()),
            "sunlight" => Some(Self::sunlight()),
            _ => None,
        }
    }
}
