//! RGBA color values and interpolation.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Format as `#RRGGBB`, dropping alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Linear color interpolation
///
/// `t` is clamped to [0, 1]; 0 returns `color1`, 1 returns `color2`.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.max(0.0).min(1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// Parse hex color string to RGB
///
/// Accepts `#RRGGBB` or `RRGGBB`.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("00FF00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#0000FF"), Some((0, 0, 255)));
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
    }

    #[test]
    fn test_interpolate_endpoints_and_clamp() {
        let black = Color::opaque(0, 0, 0);
        let white = Color::opaque(255, 255, 255);

        assert_eq!(interpolate_color(black, white, 0.0), black);
        assert_eq!(interpolate_color(black, white, 1.0), white);
        assert_eq!(interpolate_color(black, white, -2.0), black);
        assert_eq!(interpolate_color(black, white, 2.0), white);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let c = interpolate_color(Color::opaque(0, 0, 0), Color::opaque(200, 100, 50), 0.5);
        assert_eq!((c.r, c.g, c.b, c.a), (100, 50, 25, 255));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::opaque(255, 202, 40).to_hex(), "#FFCA28");
        assert_eq!(Color::opaque(0, 0, 10).to_hex(), "#00000A");
    }
}
