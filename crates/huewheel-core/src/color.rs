//! HSV color model and display-string encodings.
//!
//! The engine stores marker colors as HSV with a scientific hue. This module
//! is the conversion boundary: parsing bind input (named colors, hex,
//! `rgb(r, g, b)`), producing display strings for read-back, and exchanging
//! [`peniko::Color`] values with a renderer.

use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hue::wrap_degrees;

/// Errors produced when parsing a color specification.
#[derive(Debug, Clone, Error)]
pub enum ColorParseError {
    #[error("Unrecognized color: {0}")]
    Unrecognized(String),
}

/// Output encodings for color read-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorEncoding {
    /// `#rrggbb`
    Hex,
    /// `rgb(r, g, b)`
    Rgb,
    /// `hsl(h, s%, l%)`
    Hsl,
    /// `hsv(h, s%, v%)`
    Hsv,
}

/// CSS basic color keywords plus a few common extras.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aqua", [0x00, 0xff, 0xff]),
    ("black", [0x00, 0x00, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("brown", [0xa5, 0x2a, 0x2a]),
    ("coral", [0xff, 0x7f, 0x50]),
    ("crimson", [0xdc, 0x14, 0x3c]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("gold", [0xff, 0xd7, 0x00]),
    ("gray", [0x80, 0x80, 0x80]),
    ("green", [0x00, 0x80, 0x00]),
    ("indigo", [0x4b, 0x00, 0x82]),
    ("lime", [0x00, 0xff, 0x00]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("olive", [0x80, 0x80, 0x00]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("purple", [0x80, 0x00, 0x80]),
    ("red", [0xff, 0x00, 0x00]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("teal", [0x00, 0x80, 0x80]),
    ("violet", [0xee, 0x82, 0xee]),
    ("white", [0xff, 0xff, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
];

/// A color in HSV space: `hue` in degrees [0, 360), `saturation` and
/// `value` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    /// Create an HSV color, wrapping the hue and clamping saturation/value.
    pub fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue: wrap_degrees(hue),
            saturation: saturation.clamp(0.0, 1.0),
            value: value.clamp(0.0, 1.0),
        }
    }

    /// Parse a color specification: a named color, `#rgb`/`#rrggbb`, or
    /// `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let unrecognized = || ColorParseError::Unrecognized(input.to_string());
        let spec = input.trim().to_ascii_lowercase();

        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(unrecognized);
        }
        if let Some(body) = spec.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let mut channels = body.split(',').map(|part| part.trim().parse::<u8>());
            if let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) = (
                channels.next(),
                channels.next(),
                channels.next(),
                channels.next(),
            ) {
                return Ok(Self::from_rgb8(r, g, b));
            }
            return Err(unrecognized());
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == spec)
            .map(|&(_, [r, g, b])| Self::from_rgb8(r, g, b))
            .ok_or_else(unrecognized)
    }

    /// Convert from 8-bit RGB.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        let r = f64::from(r) / 255.0;
        let g = f64::from(g) / 255.0;
        let b = f64::from(b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Self::new(hue, saturation, max)
    }

    /// Convert to 8-bit RGB.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let h = wrap_degrees(self.hue);
        let c = self.value * self.saturation;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = self.value - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        (
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        )
    }

    /// HSL lightness and saturation for this color.
    fn to_hsl(self) -> (f64, f64) {
        let lightness = self.value * (1.0 - self.saturation / 2.0);
        let saturation = if lightness <= 0.0 || lightness >= 1.0 {
            0.0
        } else {
            (self.value - lightness) / lightness.min(1.0 - lightness)
        };
        (saturation, lightness)
    }

    /// `#rrggbb` string.
    pub fn to_hex_string(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// `rgb(r, g, b)` string.
    pub fn to_rgb_string(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("rgb({r}, {g}, {b})")
    }

    /// `hsl(h, s%, l%)` string.
    pub fn to_hsl_string(self) -> String {
        let (saturation, lightness) = self.to_hsl();
        format!(
            "hsl({}, {}%, {}%)",
            self.hue.round(),
            (saturation * 100.0).round(),
            (lightness * 100.0).round()
        )
    }

    /// `hsv(h, s%, v%)` string.
    pub fn to_hsv_string(self) -> String {
        format!(
            "hsv({}, {}%, {}%)",
            self.hue.round(),
            (self.saturation * 100.0).round(),
            (self.value * 100.0).round()
        )
    }

    /// Render this color in the requested encoding.
    pub fn encode(self, encoding: ColorEncoding) -> String {
        match encoding {
            ColorEncoding::Hex => self.to_hex_string(),
            ColorEncoding::Rgb => self.to_rgb_string(),
            ColorEncoding::Hsl => self.to_hsl_string(),
            ColorEncoding::Hsv => self.to_hsv_string(),
        }
    }
}

impl From<Hsv> for Color {
    fn from(hsv: Hsv) -> Self {
        let (r, g, b) = hsv.to_rgb8();
        Color::from_rgba8(r, g, b, 255)
    }
}

impl From<Color> for Hsv {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::from_rgb8(rgba.r, rgba.g, rgba.b)
    }
}

fn parse_hex(hex: &str) -> Option<Hsv> {
    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => {
            let digit = |b: u8| (b as char).to_digit(16).map(|d| (d * 17) as u8);
            let r = digit(bytes[0])?;
            let g = digit(bytes[1])?;
            let b = digit(bytes[2])?;
            Some(Hsv::from_rgb8(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Hsv::from_rgb8(r, g, b))
        }
        _ => None,
    }
}

/// Hex string for a hue/saturation pair at full value, as wheel markers
/// are painted.
pub fn hex_from_hue_sat(hue: f64, saturation: f64) -> String {
    Hsv::new(hue, saturation, 1.0).to_hex_string()
}
