//! Error types for parsing colors and command payloads.

use thiserror::Error;

/// Errors that can occur when parsing colors or device command payloads.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in ledgate-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string is not a `#RRGGBB` or `#RGB` hex color.
    #[error("Invalid hex color '{0}': expected #RRGGBB or #RGB")]
    InvalidHex(String),

    /// Payload has the wrong number of bytes for its command.
    #[error("Invalid command length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected payload size.
        expected: usize,
        /// Actual payload size received.
        actual: usize,
    },

    /// Payload does not start with a known command header.
    #[error("Unknown command header: {0}")]
    UnknownHeader(String),

    /// A field holds a value outside its allowed set.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hex_display() {
        let err = ParseError::InvalidHex("#ZZZ".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid hex color '#ZZZ': expected #RRGGBB or #RGB"
        );
    }

    #[test]
    fn test_invalid_length_display() {
        let err = ParseError::InvalidLength {
            expected: 7,
            actual: 4,
        };
        assert!(err.to_string().contains("expected 7 bytes"));
        assert!(err.to_string().contains("got 4"));
    }
}
