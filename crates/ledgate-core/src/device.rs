//! BLE connection to the LED controller.
//!
//! [`BleLight`] is the btleplug-backed [`LightTransport`]. It is created
//! disconnected and only talks to the radio once the session task calls
//! [`LightTransport::connect`].

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ledgate_types::uuids::LIGHT_WRITE_CHARACTERISTIC;

use crate::error::{Error, Result};
use crate::scan::{ScanOptions, find_device};
use crate::traits::LightTransport;

/// Default timeout for locating and connecting to the device.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a single characteristic write.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for disconnecting.
const DEFAULT_DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for BLE connection timeouts.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ledgate_core::device::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .connection_timeout(Duration::from_secs(20))
///     .write_timeout(Duration::from_secs(2));
/// assert_eq!(config.write_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Timeout for locating the device and establishing a connection.
    pub connection_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for one characteristic write.
    pub write_timeout: Duration,
    /// Timeout for disconnecting.
    pub disconnect_timeout: Duration,
    /// Characteristic that receives command writes.
    pub write_characteristic: Uuid,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            disconnect_timeout: DEFAULT_DISCONNECT_TIMEOUT,
            write_characteristic: LIGHT_WRITE_CHARACTERISTIC,
        }
    }
}

impl ConnectionConfig {
    /// Create a new connection config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the disconnect timeout.
    #[must_use]
    pub fn disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.disconnect_timeout = timeout;
        self
    }

    /// Use a different write characteristic.
    #[must_use]
    pub fn write_characteristic(mut self, uuid: Uuid) -> Self {
        self.write_characteristic = uuid;
        self
    }
}

/// An established link: the peripheral plus the resolved write target.
struct Link {
    /// Kept alive for as long as the peripheral is in use.
    #[allow(dead_code)]
    adapter: Adapter,
    peripheral: Peripheral,
    characteristic: Characteristic,
    write_type: WriteType,
}

/// The LED controller reached over Bluetooth Low Energy.
///
/// # Note on Clone
///
/// This struct intentionally does not implement `Clone`. It owns the BLE
/// connection, and the session task is its only user.
pub struct BleLight {
    address: String,
    config: ConnectionConfig,
    link: Option<Link>,
}

impl std::fmt::Debug for BleLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleLight")
            .field("address", &self.address)
            .field("linked", &self.link.is_some())
            .finish_non_exhaustive()
    }
}

impl BleLight {
    /// Create a transport for the device at `address` with default timeouts.
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_config(address, ConnectionConfig::default())
    }

    /// Create a transport with custom timeouts.
    pub fn with_config(address: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            address: address.into(),
            config,
            link: None,
        }
    }

    /// The connection configuration in use.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn open_link(&self) -> Result<Link> {
        if self.address.is_empty() {
            return Err(Error::invalid_config("device address is empty"));
        }

        let options = ScanOptions::default().duration(self.config.connection_timeout);
        let (adapter, peripheral) = find_device(&self.address, &options).await?;

        info!("Connecting to device...");
        timeout(self.config.connection_timeout, peripheral.connect())
            .await
            .map_err(|_| Error::timeout("connect to device", self.config.connection_timeout))??;
        info!("Connected!");

        timeout(self.config.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", self.config.discovery_timeout))??;

        let services = peripheral.services();
        debug!("Found {} services", services.len());

        let target = self.config.write_characteristic;
        let characteristic = services
            .iter()
            .flat_map(|service| service.characteristics.iter())
            .find(|c| c.uuid == target)
            .cloned();

        let Some(characteristic) = characteristic else {
            // Leave the radio in a clean state before reporting the failure
            if let Err(e) = peripheral.disconnect().await {
                warn!("Failed to disconnect after missing characteristic: {}", e);
            }
            return Err(Error::characteristic_not_found(
                target.to_string(),
                services.len(),
            ));
        };

        let write_type = if characteristic
            .properties
            .contains(CharPropFlags::WRITE_WITHOUT_RESPONSE)
        {
            WriteType::WithoutResponse
        } else {
            WriteType::WithResponse
        };
        debug!(?write_type, "Resolved write characteristic {}", target);

        Ok(Link {
            adapter,
            peripheral,
            characteristic,
            write_type,
        })
    }
}

#[async_trait]
impl LightTransport for BleLight {
    #[tracing::instrument(level = "info", skip(self), fields(address = %self.address))]
    async fn connect(&mut self) -> Result<()> {
        if let Some(link) = &self.link {
            if link.peripheral.is_connected().await.unwrap_or(false) {
                return Ok(());
            }
            // Stale handle from a dropped link
            self.link = None;
        }

        let link = self.open_link().await?;
        self.link = Some(link);
        Ok(())
    }

    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        let link = self.link.as_ref().ok_or(Error::NotConnected)?;
        let uuid = link.characteristic.uuid;

        timeout(
            self.config.write_timeout,
            link.peripheral
                .write(&link.characteristic, payload, link.write_type),
        )
        .await
        .map_err(|_| Error::timeout(format!("write characteristic {}", uuid), self.config.write_timeout))?
        .map_err(|e| Error::write_failed(uuid.to_string(), e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self), fields(address = %self.address))]
    async fn disconnect(&mut self) -> Result<()> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };

        info!("Disconnecting from device...");
        timeout(self.config.disconnect_timeout, link.peripheral.disconnect())
            .await
            .map_err(|_| Error::timeout("disconnect", self.config.disconnect_timeout))??;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        match &self.link {
            Some(link) => link.peripheral.is_connected().await.unwrap_or(false),
            None => false,
        }
    }

    fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connection_timeout, Duration::from_secs(15));
        assert_eq!(config.discovery_timeout, Duration::from_secs(10));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert_eq!(config.write_characteristic, LIGHT_WRITE_CHARACTERISTIC);
    }

    #[test]
    fn test_connection_config_builder() {
        let config = ConnectionConfig::new()
            .connection_timeout(Duration::from_secs(30))
            .discovery_timeout(Duration::from_secs(3))
            .write_timeout(Duration::from_millis(500))
            .disconnect_timeout(Duration::from_secs(1));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.discovery_timeout, Duration::from_secs(3));
        assert_eq!(config.write_timeout, Duration::from_millis(500));
        assert_eq!(config.disconnect_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_new_light_is_disconnected() {
        let light = BleLight::new("AA:BB:CC:DD:EE:FF");
        assert!(!light.is_connected().await);
        assert_eq!(light.address(), "AA:BB:CC:DD:EE:FF");
    }

    #[tokio::test]
    async fn test_write_without_link_is_not_connected() {
        let mut light = BleLight::new("AA:BB:CC:DD:EE:FF");
        let err = light.write(&[0x69]).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_disconnect_without_link_is_noop() {
        let mut light = BleLight::new("AA:BB:CC:DD:EE:FF");
        assert!(light.disconnect().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_address() {
        let mut light = BleLight::new("");
        let err = light.connect().await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_hides_internals() {
        let light = BleLight::new("AA:BB:CC:DD:EE:FF");
        let debug = format!("{:?}", light);
        assert!(debug.contains("AA:BB:CC:DD:EE:FF"));
        assert!(debug.contains("linked: false"));
    }
}
