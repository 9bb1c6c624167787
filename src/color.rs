//! Color conversion utilities
//!
//! The document service takes colors as normalized RGBA channels while style
//! presets and the panel UI speak `#RRGGBB`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// A color with channels normalized to 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::opaque(1.0, 1.0, 1.0);

    /// Create a fully opaque color
    pub const fn opaque(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        hex_to_rgba(hex)
    }

    /// Format as `#RRGGBB`, dropping alpha
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.red),
            channel(self.green),
            channel(self.blue)
        )
    }
}

/// Convert a hex color string into normalized channels.
///
/// Alpha defaults to 1 when the string only carries RGB.
pub fn hex_to_rgba(hex: &str) -> Result<Rgba> {
    let digits = hex.trim().trim_start_matches('#');
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(TableError::InvalidColor(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| -> Result<f64> {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .map(|v| f64::from(v) / 255.0)
            .ok_or_else(|| TableError::InvalidColor(hex.to_string()))
    };

    let alpha = if digits.len() == 8 { channel(6..8)? } else { 1.0 };

    Ok(Rgba {
        red: channel(0..2)?,
        green: channel(2..4)?,
        blue: channel(4..6)?,
        alpha,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgba_basic() {
        let c = hex_to_rgba("#FF0000").unwrap();
        assert_eq!(c, Rgba::opaque(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_hex_without_hash() {
        let c = hex_to_rgba("0082CB").unwrap();
        assert_eq!(c.to_hex(), "#0082CB");
        assert_eq!(c.alpha, 1.0);
    }

    #[test]
    fn test_hex_with_alpha() {
        let c = hex_to_rgba("#00000080").unwrap();
        assert!((c.alpha - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_hex() {
        let cases = ["", "#FFF", "grey", "#GG0000", "#FF00FF0"];
        for input in cases {
            assert!(
                matches!(hex_to_rgba(input), Err(TableError::InvalidColor(_))),
                "expected failure for {input:?}"
            );
        }
    }

    #[test]
    fn test_round_trip_presets() {
        for hex in ["#FFFFFF", "#000000", "#662B8C", "#E3EDFC"] {
            assert_eq!(hex_to_rgba(hex).unwrap().to_hex(), hex);
        }
    }
}
