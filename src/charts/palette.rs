//! Named color map shared by the interactive and static renderers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An sRGB color, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.0, self.1, self.2)
    }

    pub fn to_plotters(self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color `{}` must start with '#'", s))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("color `{}` is not of the form #rrggbb", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Color names used by the built-in chart presets.
pub const BUILTIN_COLORS: [(&str, Rgb); 5] = [
    ("grey", Rgb(0x6c, 0x6c, 0x6c)),
    ("red", Rgb(0xff, 0x6a, 0x6d)),
    ("blue", Rgb(0x74, 0x89, 0xff)),
    ("green", Rgb(0x8e, 0xff, 0x74)),
    ("pink", Rgb(0xe6, 0x74, 0xff)),
];

/// Named color map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(BTreeMap<String, Rgb>);

impl Default for Palette {
    fn default() -> Self {
        Self(
            BUILTIN_COLORS
                .iter()
                .map(|(name, rgb)| (name.to_string(), *rgb))
                .collect(),
        )
    }
}

impl Palette {
    /// Resolve a palette name, or a literal `#rrggbb`.
    pub fn resolve(&self, color: &str) -> Option<Rgb> {
        if color.starts_with('#') {
            return color.parse().ok();
        }
        self.0.get(color).copied()
    }
}
