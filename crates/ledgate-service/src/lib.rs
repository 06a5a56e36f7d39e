//! Password-protected HTTP gateway for a Bluetooth LED controller.
//!
//! This crate provides a service that:
//! - Keeps one BLE connection to the configured light, owned by a device session
//! - Accepts power and color commands over HTTP and queues them in order
//! - Releases the device cleanly on shutdown
//!
//! # REST API Endpoints
//!
//! - `POST /power_on` - Turn the light on
//! - `POST /power_off` - Turn the light off
//! - `POST /set_color` - Set the color from `{"color": "#RRGGBB"}` or `#RGB`
//! - `GET /status` - Session state and delivery counters
//! - `GET /health` - Service health check (no auth required)
//!
//! Every other route requires an `Authorization` header equal to the
//! configured password.
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/ledgate/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [auth]
//! password = "change-me"            # or AUTH_PASSWORD
//!
//! [device]
//! address = "AA:BB:CC:DD:EE:FF"     # or LED_DEVICE_ADDRESS
//! connect_timeout_secs = 15
//! write_timeout_secs = 5
//! connect_retries = 3
//!
//! [session]
//! queue_capacity = 64
//! drain_timeout_secs = 5
//! reconnect_on_demand = false
//! ```
//!
//! The service refuses to start without a password and a device address.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod middleware;
pub mod state;

pub use config::{
    AuthConfig, Config, ConfigError, DeviceConfig, ServerConfig, SessionConfig, ValidationError,
};
pub use lifecycle::{Lifecycle, shutdown_signal};
pub use state::AppState;
