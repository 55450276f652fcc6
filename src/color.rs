//! Color parsing and hex normalization for resolved CSS values
//!
//! Supports the following input formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`, `oklch()`, `color-mix()`
//! - Named: `red`, `blue`, `transparent`, etc.
//!
//! Colors are normalized to lowercase hex, `#rrggbbaa` by default or `#rrggbb`
//! when the alpha channel is optional and fully opaque.

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use std::fmt;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Parse a CSS color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use themevars::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("rgb(0, 255, 0)").unwrap(), image::Rgba([0, 255, 0, 255]));
/// assert_eq!(parse_color("blue").unwrap(), image::Rgba([0, 0, 255, 255]));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is invalid or unparseable.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    // Fast path for hex colors
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    parse_css_color(s)
}

/// Check whether a value is accepted as a CSS `<color>`.
///
/// This is the validity test only; keywords such as `currentcolor` are
/// accepted even though they have no fixed RGBA value.
pub fn is_css_color(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && CssColor::parse_string(s).is_ok()
}

/// Check for strict `#rrggbb` or `#rrggbbaa` hex syntax
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Normalize any parseable CSS color to hex.
///
/// ```
/// use themevars::color::normalize_css_color;
///
/// assert_eq!(normalize_css_color("rgb(17, 34, 51)", false).unwrap(), "#112233ff");
/// assert_eq!(normalize_css_color("rgb(17, 34, 51)", true).unwrap(), "#112233");
/// assert_eq!(normalize_css_color("rgba(0, 0, 0, 0.5)", true).unwrap(), "#00000080");
/// ```
pub fn normalize_css_color(s: &str, alpha_optional: bool) -> Result<String, ColorError> {
    parse_color(s).map(|rgba| HexColor::new(rgba, alpha_optional).to_string())
}

/// A color rendered as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    rgba: Rgba<u8>,
    alpha_optional: bool,
}

impl HexColor {
    pub fn new(rgba: Rgba<u8>, alpha_optional: bool) -> Self {
        Self { rgba, alpha_optional }
    }

    pub fn rgba(&self) -> Rgba<u8> {
        self.rgba
    }

    /// Whether the alpha channel is dropped when rendering
    pub fn is_short(&self) -> bool {
        self.alpha_optional && self.rgba[3] == 255
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.rgba.0;
        if self.is_short() {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

/// Serialize a color the way browsers report computed colors.
///
/// Opaque colors use `rgb(r, g, b)`, anything else `rgba(r, g, b, a)` with
/// the alpha as a trimmed decimal.
pub fn serialize_computed_color(rgba: Rgba<u8>) -> String {
    let [r, g, b, a] = rgba.0;
    if a == 255 {
        return format!("rgb({}, {}, {})", r, g, b);
    }

    let alpha = format!("{:.3}", f32::from(a) / 255.0);
    let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

/// Parse the digits of a hex color (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<u8> = hex.bytes().map(hex_value).collect();

    match digits.as_slice() {
        // Short forms double each digit
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a CSS color using lightningcss (rgb, hsl, hwb, oklch, color-mix, named colors)
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    css_color_to_rgba(css_color)
}

/// Convert a lightningcss CssColor to RGBA
fn css_color_to_rgba(color: CssColor) -> Result<Rgba<u8>, ColorError> {
    use lightningcss::values::color::FloatColor;

    let rgb_color = color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        CssColor::Float(float_color) => match float_color.as_ref() {
            // Float colors appear when components have 'none' values
            FloatColor::RGB(rgb) => {
                let r = (rgb.r * 255.0).round() as u8;
                let g = (rgb.g * 255.0).round() as u8;
                let b = (rgb.b * 255.0).round() as u8;
                let a = (rgb.alpha * 255.0).round() as u8;
                Ok(Rgba([r, g, b, a]))
            }
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}

/// Value of an ASCII hex digit (caller has validated the byte)
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
