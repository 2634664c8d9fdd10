//! RGB colour value stored on device records.
//!
//! Bulbs are driven in hue/saturation space (`0..=254` each, the Matter
//! colour-control range). Records keep the last commanded colour as an RGB
//! hex string so presentation layers can paint a tile without knowing the
//! colour model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound of the Matter hue, saturation and level ranges.
pub const MAX_LEVEL: u8 = 254;

/// An sRGB colour serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Convert a Matter hue/saturation pair at full value to RGB.
    ///
    /// Both inputs are on the `0..=254` scale; values above 254 are treated
    /// as 254.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_hue_saturation(hue: u8, saturation: u8) -> Self {
        let h = f64::from(hue.min(MAX_LEVEL)) / f64::from(MAX_LEVEL);
        let s = f64::from(saturation.min(MAX_LEVEL)) / f64::from(MAX_LEVEL);
        let v = 1.0_f64;

        if s == 0.0 {
            return Self::WHITE;
        }

        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match (sector as u8) % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let channel = |x: f64| (x * 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for RgbColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for RgbColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbColor> for String {
    fn from(value: RgbColor) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_as_lowercase_hex() {
        assert_eq!(RgbColor::new(0xB8, 0x86, 0x0B).to_string(), "#b8860b");
    }

    #[test]
    fn should_parse_hex_string() {
        let color: RgbColor = "#B8860B".parse().unwrap();
        assert_eq!(color, RgbColor::new(0xb8, 0x86, 0x0b));
    }

    #[test]
    fn should_reject_malformed_hex() {
        assert!("b8860b".parse::<RgbColor>().is_err());
        assert!("#b8860".parse::<RgbColor>().is_err());
        assert!("#zz860b".parse::<RgbColor>().is_err());
    }

    #[test]
    fn should_map_zero_saturation_to_white() {
        assert_eq!(RgbColor::from_hue_saturation(120, 0), RgbColor::WHITE);
    }

    #[test]
    fn should_map_zero_hue_full_saturation_to_red() {
        assert_eq!(
            RgbColor::from_hue_saturation(0, MAX_LEVEL),
            RgbColor::new(255, 0, 0)
        );
    }

    #[test]
    fn should_map_warm_preset_to_orange_tone() {
        let color = RgbColor::from_hue_saturation(20, 200);
        assert_eq!(color.red, 255);
        assert!(color.green > color.blue);
    }

    #[test]
    fn should_serialize_as_hex_string() {
        let json = serde_json::to_string(&RgbColor::WHITE).unwrap();
        assert_eq!(json, "\"#ffffff\"");
        let parsed: RgbColor = serde_json::from_str("\"#808080\"").unwrap();
        assert_eq!(parsed, RgbColor::new(0x80, 0x80, 0x80));
    }
}
