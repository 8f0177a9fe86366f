//! Color math shared by the extraction engine and its adapters.
//!
//! Everything here is a pure function over small value types. The only
//! fallible operation is [`from_hex`], which parses caller-provided text.

use palette::Srgb;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// An 8-bit sRGB color. Channels are always within `[0, 255]`.
pub type Rgb = Srgb<u8>;

/// Hue, saturation and value, each in `[0, 1]`.
///
/// Hue is a fraction of a full turn rather than degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// A color paired with a translucency value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.rgb.red, self.rgb.green, self.rgb.blue, self.alpha
        )
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

pub fn rgb_to_hsv(color: Rgb) -> Hsv {
    let (red, green, blue) = color.into_format::<f32>().into_components();
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = max - min;

    // Achromatic: hue is undefined, report 0.
    let h = if delta == 0.0 {
        0.0
    } else if max == red {
        let sector = (green - blue) / delta;
        (if green < blue { sector + 6.0 } else { sector }) / 6.0
    } else if max == green {
        ((blue - red) / delta + 2.0) / 6.0
    } else {
        ((red - green) / delta + 4.0) / 6.0
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        h: if h >= 1.0 { 0.0 } else { h },
        s,
        v: max,
    }
}

/// Lowercase `#rrggbb`.
pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Parses `#rrggbb` or `rrggbb`.
pub fn from_hex(hex: &str) -> Result<Rgb, HexError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return Err(HexError::Length(hex.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::Digits(hex.to_string()));
    }
    let packed =
        u32::from_str_radix(digits, 16).map_err(|_| HexError::Digits(hex.to_string()))?;
    Ok(Srgb::new(
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    ))
}

/// Shifts every channel by `amount * 255`, clamping each one independently.
///
/// This is a flat additive shift, not a luminance-preserving transform, so
/// large amounts can move the hue. Negative amounts darken.
pub fn adjust_luminance(color: Rgb, amount: f32) -> Rgb {
    let shift = |channel: u8| -> u8 {
        (f32::from(channel) + 255.0 * amount).round().clamp(0.0, 255.0) as u8
    };
    Srgb::new(shift(color.red), shift(color.green), shift(color.blue))
}

/// Attaches `alpha` as given. Range checking is the caller's job.
pub fn with_alpha(color: Rgb, alpha: f32) -> Rgba {
    Rgba { rgb: color, alpha }
}

/// Floors `value` to a multiple of `step`. `step` must be non-zero.
pub fn quantize(value: u8, step: u8) -> u8 {
    (value / step) * step
}

/// Serializes an [`Rgb`] as a `#rrggbb` string, for `#[serde(with = ...)]`.
pub mod serde_hex {
    use super::{to_hex, Rgb};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(*color))
    }
}
