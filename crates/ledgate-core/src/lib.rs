//! Core BLE library for a single Bluetooth LED controller.
//!
//! This crate owns everything between an encoded command and the radio: the
//! btleplug connection, a mock for tests, and the device session that
//! serializes all BLE access onto one task.
//!
//! # Features
//!
//! - **Device session**: fire-and-forget submits, in-order delivery, drain on shutdown
//! - **Connection retry**: configurable backoff for the initial connect
//! - **Metrics**: counters for delivered, failed, dropped and rejected commands
//! - **Mock transport**: drive the session without hardware
//! - **Service client** (`service-client` feature): HTTP client for ledgate-service
//!
//! # Platform Differences
//!
//! - **macOS**: CoreBluetooth hides MAC addresses. Configure the peripheral
//!   UUID that CoreBluetooth assigned instead; it is stable per host.
//! - **Linux/Windows**: Configure the MAC address (e.g. `AA:BB:CC:DD:EE:FF`).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use ledgate_core::{BleLight, Session, SessionOptions};
//! use ledgate_types::{Color, encode_color, encode_power};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let light = BleLight::new("AA:BB:CC:DD:EE:FF");
//!     let session = Session::spawn(light, SessionOptions::default());
//!     let handle = session.handle();
//!
//!     handle.submit(encode_power(true))?;
//!     handle.submit(encode_color(Color::new(255, 128, 0)))?;
//!
//!     session.shutdown(Duration::from_secs(5)).await;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod retry;
pub mod scan;
pub mod session;
pub mod traits;
pub mod util;

#[cfg(feature = "service-client")]
pub mod service_client;

// Re-export the value types so callers only need one crate
pub use ledgate_types::{Color, Command, DeviceCommand, encode_color, encode_power};
pub use ledgate_types::uuids;

// Core exports
pub use device::{BleLight, ConnectionConfig};
pub use error::{Error, Result, SubmitError};
pub use metrics::{SessionMetrics, SessionMetricsSnapshot};
pub use mock::{MockLight, MockLightBuilder, MockProbe};
pub use retry::{RetryConfig, connect_with_retry};
pub use scan::ScanOptions;
pub use session::{Session, SessionHandle, SessionOptions, SessionState, ShutdownReport};
pub use traits::LightTransport;
