//! Trait abstraction for the BLE link to the LED controller.
//!
//! This module provides the [`LightTransport`] trait that abstracts over the
//! real Bluetooth device and the mock used in tests.

use async_trait::async_trait;

use crate::error::Result;

/// The operations the session needs from a BLE link.
///
/// Methods take `&mut self`: a transport is owned by exactly one session task
/// and is never shared, so no interior locking is required.
///
/// # Example
///
/// ```ignore
/// use ledgate_core::{LightTransport, Result};
///
/// async fn blink<T: LightTransport>(light: &mut T) -> Result<()> {
///     light.write(&[0x69, 0x96, 0x02, 0x01, 0x01]).await?;
///     light.write(&[0x69, 0x96, 0x02, 0x01, 0x00]).await
/// }
/// ```
#[async_trait]
pub trait LightTransport: Send + 'static {
    /// Open the connection and resolve the write characteristic.
    ///
    /// Calling this while already connected should be a no-op.
    async fn connect(&mut self) -> Result<()>;

    /// Write one command payload to the device.
    async fn write(&mut self, payload: &[u8]) -> Result<()>;

    /// Close the connection.
    async fn disconnect(&mut self) -> Result<()>;

    /// Check whether the link is currently up.
    async fn is_connected(&self) -> bool;

    /// The configured device address.
    fn address(&self) -> &str;
}
