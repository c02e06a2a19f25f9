//! Hex color type used for furniture and canvas fills.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`HexColor`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The input does not start with `#`.
    #[error("color must start with '#'")]
    MissingHash,
    /// The input has a length other than `#rgb` or `#rrggbb`.
    #[error("color must be in #rgb or #rrggbb form")]
    InvalidLength,
    /// The input contains a non-hexadecimal digit.
    #[error("color contains a non-hex digit")]
    InvalidDigit,
}

/// An opaque sRGB color, written as `#rrggbb`.
///
/// ## Examples
///
/// ```
/// use elegant_haven_core::HexColor;
///
/// let slate = HexColor::parse("#334155").unwrap();
/// assert_eq!(slate.rgb(), [0x33, 0x41, 0x55]);
///
/// // Short form expands each digit
/// assert_eq!(HexColor::parse("#fff").unwrap().to_string(), "#ffffff");
///
/// assert!(HexColor::parse("334155").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    /// Default furniture color (slate).
    pub const FURNITURE_DEFAULT: Self = Self::from_rgb(0x33, 0x41, 0x55);
    /// Default canvas color (cream).
    pub const CANVAS_DEFAULT: Self = Self::from_rgb(0xf8, 0xf5, 0xf1);
    /// Wood used for legs and bed frames.
    pub const WOOD: Self = Self::from_rgb(0x8b, 0x45, 0x13);
    /// White used for mattresses and pillows.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);
    /// Gold accent used for selection outlines.
    pub const GOLD: Self = Self::from_rgb(0xc8, 0xa9, 0x6a);

    /// Build a color from its channels.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rgb` or `#rrggbb` string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the `#` prefix is missing, the length is wrong, or
    /// a digit is not hexadecimal.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit);
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| ColorError::InvalidDigit);

        match digits.len() {
            6 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Ok(Self {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            _ => Err(ColorError::InvalidLength),
        }
    }

    /// The color as `[r, g, b]`.
    #[must_use]
    pub const fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// The color as `[r, g, b, a]` with the given alpha.
    #[must_use]
    pub const fn rgba(&self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Multiply every channel by `factor` (clamped to `[0, 1]`), used for
    /// diffuse shading.
    #[must_use]
    pub fn shade(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (f32::from(c) * factor).round() as u8;
        Self::from_rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::FURNITURE_DEFAULT
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}
