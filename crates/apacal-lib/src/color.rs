//! The color value passed from the web interface to the LED strip.

use std::fmt;

/// An RGB color with a fixed, fully opaque alpha channel.
///
/// Alpha is never read from the wire; it only exists so the value lines up
/// with the usual RGBA pixel representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Color reported to the server before anything has been decoded.
    ///
    /// Distinct from black and white so "no response yet" can be told apart
    /// from a decoded color.
    pub const PLACEHOLDER: Color = Color::rgb(1, 2, 3);

    /// Opaque color from its three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

/// Formats as `#RRGGBB` (alpha is not shown).
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
