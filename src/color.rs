//! Hex colors and the preset palettes offered by the generator.

use core::fmt;
use core::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// An opaque sRGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `#RGB`; the leading `#` is optional.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstudio::color::Color;
    ///
    /// assert_eq!(Color::from_hex("#1E40AF").unwrap(), Color::rgb(0x1E, 0x40, 0xAF));
    /// assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidColor(s.to_string());
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Six uppercase hex digits without the `#`.
    pub fn hex_digits(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex_digits())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A named foreground/background pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub foreground: Color,
    pub background: Color,
}

/// Color pairs offered next to the pickers.
pub const PRESETS: [Preset; 8] = [
    Preset {
        name: "Classic",
        foreground: Color::rgb(0x00, 0x00, 0x00),
        background: Color::rgb(0xFF, 0xFF, 0xFF),
    },
    Preset {
        name: "Blue",
        foreground: Color::rgb(0x1E, 0x40, 0xAF),
        background: Color::rgb(0xEF, 0xF6, 0xFF),
    },
    Preset {
        name: "Green",
        foreground: Color::rgb(0x05, 0x96, 0x69),
        background: Color::rgb(0xEC, 0xFD, 0xF5),
    },
    Preset {
        name: "Red",
        foreground: Color::rgb(0xDC, 0x26, 0x26),
        background: Color::rgb(0xFE, 0xF2, 0xF2),
    },
    Preset {
        name: "Purple",
        foreground: Color::rgb(0x7C, 0x3A, 0xED),
        background: Color::rgb(0xF3, 0xE8, 0xFF),
    },
    Preset {
        name: "Orange",
        foreground: Color::rgb(0xEA, 0x58, 0x0C),
        background: Color::rgb(0xFF, 0xF7, 0xED),
    },
    Preset {
        name: "Pink",
        foreground: Color::rgb(0xDB, 0x27, 0x77),
        background: Color::rgb(0xFD, 0xF2, 0xF8),
    },
    Preset {
        name: "Yellow",
        foreground: Color::rgb(0xD9, 0x77, 0x06),
        background: Color::rgb(0xFF, 0xFB, 0xEB),
    },
];

/// Looks up a preset by name, ignoring case.
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::from_hex("#000000").unwrap(), Color::BLACK);
        assert_eq!(Color::from_hex("FFFFFF").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#f0a").unwrap(), Color::rgb(0xFF, 0x00, 0xAA));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#12345", "#GGGGGG", "#1234567", "red"] {
            assert!(Color::from_hex(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_display_uppercase() {
        let c = Color::from_hex("#1e40af").unwrap();
        assert_eq!(c.to_string(), "#1E40AF");
        assert_eq!(c.hex_digits(), "1E40AF");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(5, 150, 105)).unwrap();
        assert_eq!(json, "\"#059669\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(5, 150, 105));
    }

    #[test]
    fn test_preset_lookup() {
        let blue = preset("blue").unwrap();
        assert_eq!(blue.foreground.to_string(), "#1E40AF");
        assert!(preset("teal").is_none());
    }
}
