//! Locating the configured controller among nearby peripherals.
//!
//! The gateway drives exactly one device whose address is known up front, so
//! this is not general discovery: it only finds the peripheral handle that
//! btleplug needs before it can connect.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::util::{address_matches, format_peripheral_id};

/// Number of scan attempts before giving up.
const MAX_SCAN_ATTEMPTS: u32 = 3;

/// Shortest scan window per attempt.
const MIN_SCAN_WINDOW: Duration = Duration::from_secs(2);

/// Options for locating the device.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Total scan budget; each attempt scans a growing share of it.
    pub duration: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
        }
    }
}

impl ScanOptions {
    /// Set the scan duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters.into_iter().next().ok_or(Error::NoAdapter)
}

/// Find the peripheral with the given address.
///
/// Checks peripherals the adapter already knows first, then performs up to
/// three scans of increasing length. BLE advertisements are easily missed, so
/// a single short scan is not enough.
pub async fn find_device(address: &str, options: &ScanOptions) -> Result<(Adapter, Peripheral)> {
    let adapter = get_adapter().await?;

    info!(address, "Looking for device");

    if let Some(peripheral) = find_known_peripheral(&adapter, address).await? {
        info!("Found device in adapter cache (no scan needed)");
        return Ok((adapter, peripheral));
    }

    let base = (options.duration / 2).max(MIN_SCAN_WINDOW);

    for attempt in 1..=MAX_SCAN_ATTEMPTS {
        let window = base * attempt;
        info!(
            "Scan attempt {}/{} ({}s)...",
            attempt,
            MAX_SCAN_ATTEMPTS,
            window.as_secs()
        );

        adapter.start_scan(ScanFilter::default()).await?;
        let scan = ScanGuard::new(adapter.clone());
        sleep(window).await;
        scan.stop().await?;

        if let Some(peripheral) = find_known_peripheral(&adapter, address).await? {
            info!("Found device on attempt {}", attempt);
            return Ok((adapter, peripheral));
        }

        if attempt < MAX_SCAN_ATTEMPTS {
            warn!("Device not found, retrying...");
        }
    }

    Err(Error::DeviceNotFound {
        address: address.to_string(),
        attempts: MAX_SCAN_ATTEMPTS,
    })
}

/// Something that can end an active scan.
#[async_trait]
trait ScanControl: Send + Sync + 'static {
    async fn stop_scan(&self) -> Result<()>;
}

#[async_trait]
impl ScanControl for Adapter {
    async fn stop_scan(&self) -> Result<()> {
        Central::stop_scan(self).await?;
        Ok(())
    }
}

/// Stops the scan when dropped, so a cancelled lookup does not leave the
/// adapter scanning.
struct ScanGuard<S: ScanControl> {
    scanner: Option<S>,
}

impl<S: ScanControl> ScanGuard<S> {
    fn new(scanner: S) -> Self {
        Self {
            scanner: Some(scanner),
        }
    }

    /// Stop the scan and report the result.
    async fn stop(mut self) -> Result<()> {
        match self.scanner.take() {
            Some(scanner) => scanner.stop_scan().await,
            None => Ok(()),
        }
    }
}

impl<S: ScanControl> Drop for ScanGuard<S> {
    fn drop(&mut self) {
        let Some(scanner) = self.scanner.take() else {
            return;
        };

        if let Ok(handle) = Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = scanner.stop_scan().await {
                    warn!("Failed to stop interrupted scan: {}", e);
                }
            });
        } else {
            warn!("No tokio runtime available to stop interrupted scan");
        }
    }
}

/// Search the adapter's known peripherals for one matching the address.
async fn find_known_peripheral(adapter: &Adapter, address: &str) -> Result<Option<Peripheral>> {
    let peripherals = adapter.peripherals().await?;
    let wanted = address.to_lowercase();

    for peripheral in peripherals {
        // macOS identifies peripherals by UUID rather than address
        let peripheral_id = format_peripheral_id(&peripheral.id()).to_lowercase();
        if peripheral_id == wanted {
            debug!("Matched by peripheral ID: {}", peripheral_id);
            return Ok(Some(peripheral));
        }

        if let Ok(Some(props)) = peripheral.properties().await {
            let reported = props.address.to_string();
            if address_matches(&reported, address) {
                debug!("Matched by address: {}", reported);
                return Ok(Some(peripheral));
            }
        }
    }

    Ok(None)
}
