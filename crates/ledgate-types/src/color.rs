//! RGB colors and the hex color grammar accepted by the gateway.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Pure red.
    pub const RED: Color = Color::new(0xFF, 0x00, 0x00);
    /// Pure green.
    pub const GREEN: Color = Color::new(0x00, 0xFF, 0x00);
    /// Pure blue.
    pub const BLUE: Color = Color::new(0x00, 0x00, 0xFF);
    /// All channels at full intensity.
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);

    /// Create a color from its three channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse a hex color string.
    ///
    /// Accepts exactly `#RRGGBB` or the `#RGB` shorthand, with digits in either
    /// case. The shorthand doubles each nibble, so `#F0A` is `#FF00AA`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ledgate_types::Color;
    ///
    /// assert_eq!(Color::from_hex("#FF0000"), Ok(Color::RED));
    /// assert_eq!(Color::from_hex("#f00"), Ok(Color::RED));
    /// assert!(Color::from_hex("FF0000").is_err());
    /// assert!(Color::from_hex("#FFFF").is_err());
    /// ```
    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidHex(input.to_string());

        let digits = input.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // All bytes are ASCII hex digits here, so byte indexing is char indexing.
        let digits = digits.as_bytes();
        match digits.len() {
            6 => Ok(Self::new(
                hex_pair(digits[0], digits[1]),
                hex_pair(digits[2], digits[3]),
                hex_pair(digits[4], digits[5]),
            )),
            3 => Ok(Self::new(
                hex_pair(digits[0], digits[0]),
                hex_pair(digits[1], digits[1]),
                hex_pair(digits[2], digits[2]),
            )),
            _ => Err(invalid()),
        }
    }

    /// Canonical `#RRGGBB` form with uppercase digits.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// The channels in wire order (R, G, B).
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

fn hex_nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

fn hex_pair(high: u8, low: u8) -> u8 {
    (hex_nibble(high) << 4) | hex_nibble(low)
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<Color> for (u8, u8, u8) {
    fn from(color: Color) -> Self {
        (color.red, color.green, color.blue)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
