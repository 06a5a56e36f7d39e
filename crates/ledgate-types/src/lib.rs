//! Platform-agnostic types for BLE LED controllers.
//!
//! This crate provides the value types shared by the BLE session
//! (ledgate-core) and the HTTP gateway (ledgate-service):
//!
//! - [`Color`] and the `#RRGGBB` / `#RGB` hex grammar
//! - [`DeviceCommand`] and its bit-exact wire encoding as a [`Command`]
//! - UUID constants for the controller's GATT characteristic
//! - Error types for parsing
//!
//! # Example
//!
//! ```
//! use ledgate_types::{Color, DeviceCommand};
//!
//! let color: Color = "#F00".parse().unwrap();
//! let command = DeviceCommand::SetColor(color).encode();
//! assert_eq!(command.to_hex(), "69 96 05 02 ff 00 00");
//! ```

pub mod color;
pub mod command;
pub mod error;
pub mod uuid;

pub use color::Color;
pub use command::{Command, DeviceCommand, encode_color, encode_power};
pub use error::ParseError;
pub use uuid as uuids;
