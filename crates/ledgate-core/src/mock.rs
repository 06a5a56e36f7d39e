//! Mock light implementation for testing.
//!
//! This module provides a mock transport that can be used for unit testing
//! without requiring actual BLE hardware.
//!
//! A [`MockLight`] is moved into the session task like a real transport, so
//! tests keep a [`MockProbe`] to observe it from the outside.
//!
//! # Features
//!
//! - **Write log**: Every successful write is recorded in arrival order
//! - **Failure injection**: Fail connects, fail writes, or drop the link after N writes
//! - **Latency simulation**: Add artificial delays to writes to simulate slow BLE

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::LightTransport;

#[derive(Debug, Default)]
struct MockState {
    connected: AtomicBool,
    writes: Mutex<Vec<Vec<u8>>>,
    connect_calls: AtomicU32,
    disconnect_calls: AtomicU32,
    write_attempts: AtomicU32,
    /// Remaining connect attempts that should fail.
    failing_connects: AtomicU32,
    fail_writes: AtomicBool,
    write_latency_ms: AtomicU64,
    /// Drop the link once this many writes have succeeded (0 = never).
    drop_after_writes: AtomicU32,
}

impl MockState {
    fn writes(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        // A panicking test thread must not hide the log from the others
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A mock LED controller for testing.
///
/// # Example
///
/// ```
/// use ledgate_core::{LightTransport, MockLight};
///
/// #[tokio::main]
/// async fn main() {
///     let mut light = MockLight::new("AA:BB:CC:DD:EE:FF");
///     let probe = light.probe();
///
///     light.connect().await.unwrap();
///     light.write(&[0x69, 0x96, 0x02, 0x01, 0x01]).await.unwrap();
///
///     assert_eq!(probe.writes(), vec![vec![0x69, 0x96, 0x02, 0x01, 0x01]]);
/// }
/// ```
#[derive(Debug)]
pub struct MockLight {
    address: String,
    state: Arc<MockState>,
}

impl MockLight {
    /// Create a new mock light that connects and writes successfully.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            state: Arc::new(MockState::default()),
        }
    }

    /// Create a builder for configuring failure modes up front.
    pub fn builder(address: &str) -> MockLightBuilder {
        MockLightBuilder::new(address)
    }

    /// Get a probe that observes this light after it has been moved.
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl LightTransport for MockLight {
    async fn connect(&mut self) -> Result<()> {
        self.state.connect_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.state.failing_connects.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.state.failing_connects.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(Error::DeviceNotFound {
                address: self.address.clone(),
                attempts: 1,
            });
        }

        self.state.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        self.state.write_attempts.fetch_add(1, Ordering::SeqCst);

        let latency = self.state.write_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if !self.state.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::write_failed("mock", "Mock write failure"));
        }

        let count = {
            let mut writes = self.state.writes();
            writes.push(payload.to_vec());
            writes.len()
        };

        let drop_after = self.state.drop_after_writes.load(Ordering::SeqCst) as usize;
        if drop_after > 0 && count >= drop_after {
            self.state.connected.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.state.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.state.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    fn address(&self) -> &str {
        &self.address
    }
}

/// Observer and controller for a [`MockLight`] owned by someone else.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<MockState>,
}

impl MockProbe {
    /// Payloads written so far, in arrival order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.writes().clone()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.state.writes().len()
    }

    /// Number of write calls, including failed ones.
    pub fn write_attempts(&self) -> u32 {
        self.state.write_attempts.load(Ordering::SeqCst)
    }

    /// Number of connect calls.
    pub fn connect_calls(&self) -> u32 {
        self.state.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of disconnect calls.
    pub fn disconnect_calls(&self) -> u32 {
        self.state.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Whether the mock link is up.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Simulate the device going out of range.
    pub fn drop_link(&self) {
        self.state.connected.store(false, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` connect attempts fail.
    pub fn set_failing_connects(&self, count: u32) {
        self.state.failing_connects.store(count, Ordering::SeqCst);
    }

    /// Set simulated latency for each write.
    pub fn set_write_latency(&self, latency: Duration) {
        self.state
            .write_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }
}

/// Builder for creating mock lights with custom behavior.
#[derive(Debug)]
pub struct MockLightBuilder {
    address: String,
    failing_connects: u32,
    fail_writes: bool,
    write_latency: Duration,
    drop_after_writes: u32,
}

impl MockLightBuilder {
    /// Create a new builder with a well-behaved default.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            failing_connects: 0,
            fail_writes: false,
            write_latency: Duration::ZERO,
            drop_after_writes: 0,
        }
    }

    /// Fail the first `count` connect attempts.
    pub fn failing_connects(mut self, count: u32) -> Self {
        self.failing_connects = count;
        self
    }

    /// Never succeed in connecting.
    pub fn unreachable(mut self) -> Self {
        self.failing_connects = u32::MAX;
        self
    }

    /// Fail every write.
    pub fn fail_writes(mut self, fail: bool) -> Self {
        self.fail_writes = fail;
        self
    }

    /// Delay every write.
    pub fn write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    /// Lose the link after `count` successful writes.
    pub fn drop_after_writes(mut self, count: u32) -> Self {
        self.drop_after_writes = count;
        self
    }

    /// Build the mock light.
    pub fn build(self) -> MockLight {
        let light = MockLight::new(&self.address);
        let probe = light.probe();
        probe.set_failing_connects(self.failing_connects);
        probe.set_fail_writes(self.fail_writes);
        probe.set_write_latency(self.write_latency);
        light
            .state
            .drop_after_writes
            .store(self.drop_after_writes, Ordering::SeqCst);
        light
    }
}
