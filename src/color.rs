//! Color parsing and formatting
//!
//! Tool colors and palette entries travel as strings at the editor boundary.
//! Supported input formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`, `oklch()`
//! - Named: `red`, `blue`, `transparent`, etc.

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, FloatColor};
use thiserror::Error;

/// Fully transparent black, the initial value of every new layer pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Why a color string was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    /// Hex digit count after `#` other than 3, 4, 6 or 8
    #[error("hex color has {0} digits, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    #[error("'{0}' is not a hex digit")]
    InvalidHex(char),
    /// Rejected by the CSS color parser
    #[error("invalid CSS color: {0}")]
    CssParse(String),
}

/// Parse a color string into an RGBA color.
///
/// Hex strings take a fast path; everything else goes through lightningcss.
///
/// # Examples
///
/// ```
/// use pxed::color::parse_color;
///
/// let red = parse_color("#F00").unwrap();
/// assert_eq!(red, image::Rgba([255, 0, 0, 255]));
///
/// let green = parse_color("rgb(0, 255, 0)").unwrap();
/// assert_eq!(green, image::Rgba([0, 255, 0, 255]));
///
/// let blue = parse_color("blue").unwrap();
/// assert_eq!(blue, image::Rgba([0, 0, 255, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_digits(hex);
    }

    parse_css_color(s)
}

/// Format a color as uppercase hex.
///
/// Opaque colors use `#RRGGBB`; anything with alpha below 255 uses `#RRGGBBAA`.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        rgb_hex(r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Format an RGB triple as `#RRGGBB`.
pub fn rgb_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Parse the digits of a hex color (without the leading `#`).
fn parse_hex_digits(hex: &str) -> Result<Rgba<u8>, ColorError> {
    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    // All characters are ASCII hex digits from here on, so byte indexing is safe.
    let bytes = hex.as_bytes();
    let nibble = |i: usize| hex_value(bytes[i]);
    let pair = |i: usize| hex_value(bytes[i]) * 16 + hex_value(bytes[i + 1]);

    match bytes.len() {
        3 => Ok(Rgba([nibble(0) * 17, nibble(1) * 17, nibble(2) * 17, 255])),
        4 => Ok(Rgba([nibble(0) * 17, nibble(1) * 17, nibble(2) * 17, nibble(3) * 17])),
        6 => Ok(Rgba([pair(0), pair(2), pair(4), 255])),
        8 => Ok(Rgba([pair(0), pair(2), pair(4), pair(6)])),
        len => Err(ColorError::InvalidLength(len)),
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Everything that is not hex: functional notations and named colors.
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let parsed = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb = parsed
        .to_rgb()
        .map_err(|_| ColorError::CssParse(format!("'{}' has no sRGB form", s)))?;

    match rgb {
        CssColor::RGBA(c) => Ok(Rgba([c.red, c.green, c.blue, c.alpha])),
        // `none` components keep the color in float form
        CssColor::Float(float) => match *float {
            FloatColor::RGB(c) => Ok(Rgba([c.r, c.g, c.b, c.alpha].map(unit_to_byte))),
            _ => Err(ColorError::CssParse(format!("'{}' is not an sRGB color", s))),
        },
        _ => Err(ColorError::CssParse(format!("'{}' is not an sRGB color", s))),
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
