//! Wire encoding of LED controller commands.
//!
//! Every command starts with the magic `69 96`, followed by a length/opcode
//! pair and the operands:
//!
//! | Command | Bytes |
//! |---------|-------|
//! | Power on | `69 96 02 01 01` |
//! | Power off | `69 96 02 01 00` |
//! | Set color | `69 96 05 02 RR GG BB` |
//!
//! These encodings are fixed by the device firmware and must stay bit-exact.

use core::fmt;

use bytes::Bytes;

use crate::color::Color;
use crate::error::ParseError;

/// Header shared by all power commands.
pub const POWER_HEADER: [u8; 4] = [0x69, 0x96, 0x02, 0x01];

/// Header shared by all color commands.
pub const COLOR_HEADER: [u8; 4] = [0x69, 0x96, 0x05, 0x02];

/// Total length of a power command.
pub const POWER_COMMAND_LEN: usize = 5;

/// Total length of a color command.
pub const COLOR_COMMAND_LEN: usize = 7;

/// A logical device operation, before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Switch the lights on or off.
    Power {
        /// `true` for on.
        on: bool,
    },
    /// Set all LEDs to a single color.
    SetColor(Color),
}

impl DeviceCommand {
    /// Encode this operation into its wire payload.
    #[must_use]
    pub fn encode(&self) -> Command {
        match *self {
            DeviceCommand::Power { on } => encode_power(on),
            DeviceCommand::SetColor(color) => encode_color(color),
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::Power { on: true } => write!(f, "power on"),
            DeviceCommand::Power { on: false } => write!(f, "power off"),
            DeviceCommand::SetColor(color) => write!(f, "set color {color}"),
        }
    }
}

/// An encoded, immutable command payload.
///
/// Cloning is cheap: the bytes are reference counted and never mutated.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Command(Bytes);

impl Command {
    /// Wrap raw bytes without validating them.
    ///
    /// Prefer [`encode_power`] and [`encode_color`]; this exists for
    /// transports and tests that need arbitrary payloads.
    #[must_use]
    pub fn from_raw(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-separated lowercase hex, e.g. `69 96 02 01 01`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decode the payload back into the operation it encodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is unknown, the length does not match
    /// the header, or the power flag is neither `00` nor `01`.
    pub fn decode(&self) -> Result<DeviceCommand, ParseError> {
        let data = self.as_bytes();
        if data.len() < 4 {
            return Err(ParseError::UnknownHeader(self.to_hex()));
        }

        let header = &data[..4];
        if header == POWER_HEADER {
            if data.len() != POWER_COMMAND_LEN {
                return Err(ParseError::InvalidLength {
                    expected: POWER_COMMAND_LEN,
                    actual: data.len(),
                });
            }
            match data[4] {
                0x00 => Ok(DeviceCommand::Power { on: false }),
                0x01 => Ok(DeviceCommand::Power { on: true }),
                other => Err(ParseError::InvalidValue(format!(
                    "power flag 0x{other:02X}"
                ))),
            }
        } else if header == COLOR_HEADER {
            if data.len() != COLOR_COMMAND_LEN {
                return Err(ParseError::InvalidLength {
                    expected: COLOR_COMMAND_LEN,
                    actual: data.len(),
                });
            }
            Ok(DeviceCommand::SetColor(Color::new(data[4], data[5], data[6])))
        } else {
            Err(ParseError::UnknownHeader(
                header
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ))
        }
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({})", self.to_hex())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<DeviceCommand> for Command {
    fn from(command: DeviceCommand) -> Self {
        command.encode()
    }
}

/// Encode a power command.
///
/// # Examples
///
/// ```
/// use ledgate_types::encode_power;
///
/// assert_eq!(encode_power(true).as_bytes(), &[0x69, 0x96, 0x02, 0x01, 0x01]);
/// assert_eq!(encode_power(false).as_bytes(), &[0x69, 0x96, 0x02, 0x01, 0x00]);
/// ```
#[must_use]
pub fn encode_power(on: bool) -> Command {
    let [a, b, c, d] = POWER_HEADER;
    Command(Bytes::copy_from_slice(&[a, b, c, d, u8::from(on)]))
}

/// Encode a set-color command.
///
/// # Examples
///
/// ```
/// use ledgate_types::{Color, encode_color};
///
/// let command = encode_color(Color::RED);
/// assert_eq!(command.as_bytes(), &[0x69, 0x96, 0x05, 0x02, 0xFF, 0x00, 0x00]);
/// ```
#[must_use]
pub fn encode_color(color: Color) -> Command {
    let [a, b, c, d] = COLOR_HEADER;
    let [r, g, bl] = color.to_bytes();
    Command(Bytes::copy_from_slice(&[a, b, c, d, r, g, bl]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_on_bytes() {
        assert_eq!(encode_power(true).as_bytes(), &[0x69, 0x96, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_power_off_bytes() {
        assert_eq!(encode_power(false).as_bytes(), &[0x69, 0x96, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_red_color_bytes() {
        let color = Color::from_hex("#FF0000").unwrap();
        assert_eq!(
            encode_color(color).as_bytes(),
            &[0x69, 0x96, 0x05, 0x02, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn test_color_channel_order() {
        let command = encode_color(Color::new(0x11, 0x22, 0x33));
        assert_eq!(&command.as_bytes()[4..], &[0x11, 0x22, 0x33]);
        assert_eq!(command.len(), COLOR_COMMAND_LEN);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(encode_power(true).to_hex(), "69 96 02 01 01");
        assert_eq!(format!("{:?}", encode_power(false)), "Command(69 96 02 01 00)");
    }

    #[test]
    fn test_device_command_encode() {
        assert_eq!(DeviceCommand::Power { on: true }.encode(), encode_power(true));
        assert_eq!(
            Command::from(DeviceCommand::SetColor(Color::BLUE)),
            encode_color(Color::BLUE)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Command::from_raw(vec![0x69, 0x96]).decode(),
            Err(ParseError::UnknownHeader(_))
        ));
        assert!(matches!(
            Command::from_raw(vec![0x00, 0x00, 0x00, 0x00, 0x00]).decode(),
            Err(ParseError::UnknownHeader(_))
        ));
        assert_eq!(
            Command::from_raw(vec![0x69, 0x96, 0x05, 0x02, 0xFF]).decode(),
            Err(ParseError::InvalidLength {
                expected: 7,
                actual: 5
            })
        );
        assert!(matches!(
            Command::from_raw(vec![0x69, 0x96, 0x02, 0x01, 0x02]).decode(),
            Err(ParseError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceCommand::Power { on: true }.to_string(), "power on");
        assert_eq!(
            DeviceCommand::SetColor(Color::RED).to_string(),
            "set color #FF0000"
        );
    }

    proptest! {
        #[test]
        fn prop_color_encode_decode(r: u8, g: u8, b: u8) {
            let intent = DeviceCommand::SetColor(Color::new(r, g, b));
            prop_assert_eq!(intent.encode().decode(), Ok(intent));
        }

        #[test]
        fn prop_hex_to_command_to_rgb(r: u8, g: u8, b: u8) {
            let color = Color::from_hex(&format!("#{r:02x}{g:02X}{b:02x}")).unwrap();
            let decoded = encode_color(color).decode().unwrap();
            prop_assert_eq!(decoded, DeviceCommand::SetColor(Color::new(r, g, b)));
        }

        #[test]
        fn prop_power_encode_decode(on: bool) {
            let intent = DeviceCommand::Power { on };
            prop_assert_eq!(intent.encode().decode(), Ok(intent));
        }
    }
}
