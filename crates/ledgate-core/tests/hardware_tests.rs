//! Hardware integration tests for ledgate-core
//!
//! These tests require a real LED controller in range and should be run with:
//! ```
//! cargo test --package ledgate-core --test hardware_tests -- --ignored --nocapture
//! ```
//!
//! Configure the device via environment variable:
//! - `LEDGATE_DEVICE`: MAC address (Linux/Windows) or CoreBluetooth UUID (macOS)
//!
//! Example:
//! ```
//! LEDGATE_DEVICE="AA:BB:CC:DD:EE:FF" cargo test --package ledgate-core --test hardware_tests -- --ignored --nocapture
//! ```

use std::env;
use std::time::Duration;

use ledgate_core::scan::find_device;
use ledgate_core::{
    BleLight, Color, LightTransport, RetryConfig, ScanOptions, Session, SessionOptions,
    SessionState, encode_color, encode_power,
};
use tokio::time::{sleep, timeout};

/// Default timeout for BLE operations
const BLE_TIMEOUT: Duration = Duration::from_secs(45);

fn get_device() -> Option<String> {
    env::var("LEDGATE_DEVICE").ok().filter(|s| !s.is_empty())
}

// =============================================================================
// Locate / Connect
// =============================================================================

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_find_configured_device() {
    let Some(address) = get_device() else {
        println!("LEDGATE_DEVICE not set, skipping");
        return;
    };

    let result = timeout(BLE_TIMEOUT, find_device(&address, &ScanOptions::default())).await;

    match result {
        Ok(Ok((_adapter, _peripheral))) => println!("Found {}", address),
        Ok(Err(e)) => panic!("Locating device failed: {}", e),
        Err(_) => panic!("Locating device timed out"),
    }
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_connect_write_disconnect() {
    let Some(address) = get_device() else {
        println!("LEDGATE_DEVICE not set, skipping");
        return;
    };

    let mut light = BleLight::new(&address);

    timeout(BLE_TIMEOUT, light.connect())
        .await
        .expect("connect timed out")
        .expect("connect failed");
    assert!(light.is_connected().await);

    light
        .write(encode_power(true).as_bytes())
        .await
        .expect("power on failed");
    sleep(Duration::from_millis(500)).await;
    light
        .write(encode_color(Color::GREEN).as_bytes())
        .await
        .expect("set color failed");

    light.disconnect().await.expect("disconnect failed");
    assert!(!light.is_connected().await);
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_session_cycles_colors() {
    let Some(address) = get_device() else {
        println!("LEDGATE_DEVICE not set, skipping");
        return;
    };

    let options = SessionOptions::default().connect_retry(RetryConfig::for_connect());
    let session = Session::spawn(BleLight::new(&address), options);
    let handle = session.handle();

    let mut states = handle.subscribe_state();
    timeout(
        BLE_TIMEOUT,
        states.wait_for(|s| matches!(s, SessionState::Connected | SessionState::NotConnected)),
    )
    .await
    .expect("session did not settle")
    .expect("session task ended");
    assert_eq!(handle.state(), SessionState::Connected);

    handle.submit(encode_power(true)).unwrap();
    for color in [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE] {
        handle.submit(encode_color(color)).unwrap();
    }

    let report = session.shutdown(Duration::from_secs(10)).await;
    println!("Shutdown report: {:?}", report);
    assert!(report.drained);
    assert_eq!(report.metrics.delivered, 5);
    assert!(report.disconnect_error.is_none());
}
