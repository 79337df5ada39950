use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// 24-bit RGB colour stored as `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "u32")]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    /// Create from a hex value, bits above 24 are dropped
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0xFF_FFFF)
    }

    /// Create from sRGB components in 0..=1
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        Self((to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b))
    }

    /// Create from linear-light components, as stored by glTF materials
    pub fn from_linear(r: f32, g: f32, b: f32) -> Self {
        Self::from_rgb(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }

    pub const fn hex(&self) -> u32 {
        self.0
    }

    /// sRGB components in 0..=1
    pub fn to_srgb(&self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xFF) as f32 / 255.0,
            ((self.0 >> 8) & 0xFF) as f32 / 255.0,
            (self.0 & 0xFF) as f32 / 255.0,
        ]
    }

    /// Linear-light components, what the shaders blend in
    pub fn to_linear(&self) -> [f32; 3] {
        self.to_srgb().map(srgb_to_linear)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Accepts `#RRGGBB`, `0xRRGGBB` or bare `RRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("expected 6 hex digits in colour {:?}", s);
        }

        let hex = u32::from_str_radix(digits, 16)
            .with_context(|| format!("invalid hex colour {:?}", s))?;
        Ok(Self(hex))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(u32),
    Text(String),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) if hex <= 0xFF_FFFF => Ok(Color(hex)),
            ColorRepr::Hex(hex) => Err(format!("colour {:#x} exceeds 0xFFFFFF", hex)),
            ColorRepr::Text(text) => text.parse().map_err(|e: anyhow::Error| e.to_string()),
        }
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
