//! Error types for ledgate-core.
//!
//! Two families of errors live here:
//!
//! - [`Error`]: failures of the BLE link itself (connect, write, disconnect).
//!   These stay inside the session task. They are logged and counted but never
//!   returned to whoever submitted the command.
//! - [`SubmitError`]: the only failure a submitter can observe, raised when a
//!   command could not even be enqueued.
//!
//! ## Retry classification
//!
//! | Error Type | Retryable | Rationale |
//! |------------|-----------|-----------|
//! | [`Error::Timeout`] | yes | Transient BLE congestion |
//! | [`Error::Bluetooth`] | yes | Often transient |
//! | [`Error::DeviceNotFound`] | yes | Device may be advertising slowly |
//! | [`Error::WriteFailed`] | yes | BLE writes fail transiently |
//! | [`Error::NotConnected`] | no | Needs a connect, not a retry |
//! | [`Error::NoAdapter`] | no | Host has no usable Bluetooth |
//! | [`Error::CharacteristicNotFound`] | no | Wrong device or firmware |
//! | [`Error::InvalidConfig`] | no | Fix configuration and restart |

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the LED controller.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No Bluetooth adapter is available on this host.
    #[error("No Bluetooth adapter available")]
    NoAdapter,

    /// The configured device was not seen in any scan.
    #[error("Device '{address}' not found after {attempts} scan attempt(s)")]
    DeviceNotFound {
        /// The address that was searched for.
        address: String,
        /// Number of scans performed.
        attempts: u32,
    },

    /// Operation attempted while not connected to device.
    #[error("Not connected to device")]
    NotConnected,

    /// Required BLE characteristic not found on device.
    #[error("Characteristic not found: {uuid} (searched in {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Write operation failed.
    #[error("Write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }

    /// Create a write failure.
    pub fn write_failed(uuid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            uuid: uuid.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether retrying the same operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. }
                | Error::Bluetooth(_)
                | Error::DeviceNotFound { .. }
                | Error::WriteFailed { .. }
        )
    }
}

/// Result type alias using ledgate-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a command could not be handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The session queue is at capacity; the command was rejected.
    #[error("Command queue is full ({capacity} pending)")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The session has shut down and accepts no more commands.
    #[error("Device session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "Not connected to device");

        let err = Error::characteristic_not_found("0000ee01", 3);
        assert!(err.to_string().contains("0000ee01"));
        assert!(err.to_string().contains("3 services"));

        let err = Error::timeout("write characteristic", Duration::from_secs(5));
        assert!(err.to_string().contains("write characteristic"));
        assert!(err.to_string().contains("5s"));

        let err = Error::DeviceNotFound {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            attempts: 3,
        };
        assert!(err.to_string().contains("AA:BB:CC:DD:EE:FF"));
        assert!(err.to_string().contains("3 scan"));
    }

    #[test]
    fn test_retry_classification() {
        assert!(Error::timeout("connect", Duration::from_secs(1)).is_retryable());
        assert!(Error::write_failed("x", "busy").is_retryable());
        assert!(
            Error::DeviceNotFound {
                address: "x".to_string(),
                attempts: 1
            }
            .is_retryable()
        );
        assert!(!Error::NotConnected.is_retryable());
        assert!(!Error::NoAdapter.is_retryable());
        assert!(!Error::invalid_config("bad").is_retryable());
        assert!(!Error::characteristic_not_found("x", 0).is_retryable());
    }

    #[test]
    fn test_btleplug_error_conversion() {
        fn _assert_from_impl<T: From<btleplug::Error>>() {}
        _assert_from_impl::<Error>();
    }

    #[test]
    fn test_submit_error_display() {
        assert_eq!(
            SubmitError::QueueFull { capacity: 64 }.to_string(),
            "Command queue is full (64 pending)"
        );
        assert_eq!(SubmitError::Closed.to_string(), "Device session is closed");
    }
}
