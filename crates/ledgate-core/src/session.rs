//! The device session: one task that owns the BLE link.
//!
//! A [`Session`] spawns a single Tokio task that owns the [`LightTransport`].
//! Every connect, write and disconnect happens on that task, one at a time,
//! so two BLE operations can never overlap. Callers talk to it through a
//! cloneable [`SessionHandle`] whose [`submit`](SessionHandle::submit) only
//! enqueues and returns.
//!
//! # Architecture
//!
//! The task runs a `tokio::select!` loop over:
//! - the command queue (a bounded `mpsc` channel, drained in FIFO order)
//! - a cancellation token, fired when shutdown gives up draining
//!
//! Delivery outcomes never travel back to the submitter. They are logged,
//! counted in [`SessionMetrics`], and reflected in [`SessionState`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ledgate_core::{MockLight, Session, SessionOptions};
//! use ledgate_types::encode_power;
//!
//! #[tokio::main]
//! async fn main() {
//!     let light = MockLight::new("AA:BB:CC:DD:EE:FF");
//!     let probe = light.probe();
//!
//!     let session = Session::spawn(light, SessionOptions::default());
//!     session.handle().submit(encode_power(true)).unwrap();
//!
//!     let report = session.shutdown(Duration::from_secs(5)).await;
//!     assert!(report.drained);
//!     assert_eq!(probe.writes(), vec![vec![0x69, 0x96, 0x02, 0x01, 0x01]]);
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ledgate_types::Command;

use crate::error::SubmitError;
use crate::metrics::{SessionMetrics, SessionMetricsSnapshot};
use crate::retry::{RetryConfig, connect_with_retry};
use crate::traits::LightTransport;

/// Default number of commands that may wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Connection state of the session.
///
/// ```text
/// Uninitialized -> Connecting -> Connected <-> NotConnected
///                                      \           /
///                                      Disconnecting -> Disconnected
/// ```
///
/// `NotConnected -> Connecting` only happens with
/// [`SessionOptions::reconnect_on_demand`]. `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The task has not started yet.
    Uninitialized,
    /// A connect attempt is in progress.
    Connecting,
    /// The link is up and commands are being written.
    Connected,
    /// The link is down; commands are dropped.
    NotConnected,
    /// Shutdown is tearing the link down.
    Disconnecting,
    /// The session has stopped. No further commands are accepted.
    Disconnected,
}

impl SessionState {
    /// Whether the session has shut down.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::NotConnected => "not connected",
            SessionState::Disconnecting => "disconnecting",
            SessionState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Options for [`Session::spawn`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum number of queued commands. Submits beyond this are rejected.
    pub queue_capacity: usize,
    /// Retry policy for the initial connect.
    pub connect_retry: RetryConfig,
    /// Make one connect attempt before dropping a command while disconnected.
    pub reconnect_on_demand: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_retry: RetryConfig::for_connect(),
            reconnect_on_demand: false,
        }
    }
}

impl SessionOptions {
    /// Set the queue capacity (at least 1).
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the retry policy for the initial connect.
    #[must_use]
    pub fn connect_retry(mut self, retry: RetryConfig) -> Self {
        self.connect_retry = retry;
        self
    }

    /// Enable or disable reconnecting when a command arrives while disconnected.
    #[must_use]
    pub fn reconnect_on_demand(mut self, enabled: bool) -> Self {
        self.reconnect_on_demand = enabled;
        self
    }
}

/// Summary returned by [`Session::shutdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Whether every queued command was processed before the deadline.
    pub drained: bool,
    /// Commands given up on because the drain deadline passed.
    pub abandoned: u64,
    /// Error from the final disconnect, if any.
    pub disconnect_error: Option<String>,
    /// Final metrics.
    pub metrics: SessionMetricsSnapshot,
}

enum Message {
    Deliver(Command),
    Shutdown,
}

/// Cloneable front door to a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
    state: watch::Receiver<SessionState>,
    metrics: Arc<SessionMetrics>,
    accepting: Arc<AtomicBool>,
    address: Arc<str>,
    capacity: usize,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("address", &self.address)
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Enqueue a command for delivery and return immediately.
    ///
    /// `Ok` means the command was accepted, not that it reached the device.
    /// If the device is not connected when the command's turn comes, it is
    /// dropped and logged.
    pub fn submit(&self, command: impl Into<Command>) -> Result<(), SubmitError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(SubmitError::Closed);
        }

        match self.tx.try_send(Message::Deliver(command.into())) {
            Ok(()) => {
                self.metrics.record_submitted();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_rejected();
                warn!(capacity = self.capacity, "Command queue full, rejecting command");
                Err(SubmitError::QueueFull {
                    capacity: self.capacity,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SubmitError::Closed),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Snapshot of the delivery counters.
    pub fn metrics(&self) -> SessionMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Address of the device this session drives.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Maximum number of queued commands.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A running device session.
///
/// Dropping a `Session` without calling [`shutdown`](Session::shutdown) leaves
/// the task running until every [`SessionHandle`] is gone; it then disconnects
/// on its own.
pub struct Session {
    handle: SessionHandle,
    cancel: CancellationToken,
    task: JoinHandle<ShutdownReport>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start the session task. It begins connecting immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<T: LightTransport>(transport: T, options: SessionOptions) -> Self {
        let capacity = options.queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (state_tx, state_rx) = watch::channel(SessionState::Uninitialized);
        let metrics = Arc::new(SessionMetrics::new());
        let cancel = CancellationToken::new();

        let handle = SessionHandle {
            tx,
            state: state_rx,
            metrics: Arc::clone(&metrics),
            accepting: Arc::new(AtomicBool::new(true)),
            address: Arc::from(transport.address()),
            capacity,
        };

        let worker = SessionWorker {
            transport,
            rx,
            state: state_tx,
            metrics,
            options,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            handle,
            cancel,
            task,
        }
    }

    /// Get a handle for submitting commands.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop accepting commands, drain the queue, and disconnect.
    ///
    /// Commands submitted before this call are delivered in order. If that
    /// takes longer than `drain_timeout`, the in-flight write and everything
    /// still queued is abandoned and the device is disconnected anyway.
    /// Disconnect runs exactly once, on the session task.
    pub async fn shutdown(self, drain_timeout: Duration) -> ShutdownReport {
        let Session {
            handle,
            cancel,
            mut task,
        } = self;

        handle.accepting.store(false, Ordering::SeqCst);
        info!(
            pending = handle.metrics().pending(),
            "Shutting down device session"
        );

        let drained = timeout(drain_timeout, async {
            // Queued behind everything already accepted
            let _ = handle.tx.send(Message::Shutdown).await;
            (&mut task).await
        })
        .await;

        let joined = match drained {
            Ok(joined) => joined,
            Err(_) => {
                warn!(?drain_timeout, "Drain timed out, abandoning remaining commands");
                cancel.cancel();
                task.await
            }
        };

        match joined {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Device session task failed");
                ShutdownReport {
                    drained: false,
                    abandoned: 0,
                    disconnect_error: Some(e.to_string()),
                    metrics: handle.metrics(),
                }
            }
        }
    }
}

struct SessionWorker<T> {
    transport: T,
    rx: mpsc::Receiver<Message>,
    state: watch::Sender<SessionState>,
    metrics: Arc<SessionMetrics>,
    options: SessionOptions,
    cancel: CancellationToken,
}

impl<T: LightTransport> SessionWorker<T> {
    async fn run(mut self) -> ShutdownReport {
        let cancel = self.cancel.clone();
        let address = self.transport.address().to_string();
        info!(address = %address, "Device session started");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = self.initial_connect() => {}
        }

        let mut abandoned = 0;
        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = self.rx.recv() => message,
            };

            match message {
                Some(Message::Deliver(command)) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            warn!(command = %command.to_hex(), "Abandoning in-flight command");
                            abandoned += 1;
                            break;
                        }
                        _ = self.deliver(&command) => {}
                    }
                }
                Some(Message::Shutdown) => {
                    debug!("Reached shutdown marker, queue drained");
                    break;
                }
                None => {
                    info!("All session handles dropped, shutting down");
                    break;
                }
            }
        }

        self.rx.close();
        while let Ok(message) = self.rx.try_recv() {
            if let Message::Deliver(_) = message {
                abandoned += 1;
            }
        }
        if abandoned > 0 {
            self.metrics.record_abandoned(abandoned);
        }

        let disconnect_error = self.disconnect().await;
        info!(address = %address, "Device session stopped");

        ShutdownReport {
            drained: !cancel.is_cancelled(),
            abandoned,
            disconnect_error,
            metrics: self.metrics.snapshot(),
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            debug!(from = %current, to = %state, "Session state changed");
            *current = state;
            true
        });
    }

    async fn initial_connect(&mut self) {
        self.set_state(SessionState::Connecting);
        match connect_with_retry(&mut self.transport, &self.options.connect_retry).await {
            Ok(()) => {
                info!(address = self.transport.address(), "Connected to device");
                self.set_state(SessionState::Connected);
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to device, commands will be dropped");
                self.metrics.record_error(&e);
                self.set_state(SessionState::NotConnected);
            }
        }
    }

    async fn reconnect(&mut self) -> bool {
        info!("Device not connected, attempting to reconnect");
        self.set_state(SessionState::Connecting);
        match self.transport.connect().await {
            Ok(()) => {
                info!("Reconnected to device");
                self.set_state(SessionState::Connected);
                true
            }
            Err(e) => {
                warn!(error = %e, "Reconnect failed");
                self.metrics.record_error(&e);
                self.set_state(SessionState::NotConnected);
                false
            }
        }
    }

    async fn deliver(&mut self, command: &Command) {
        if !self.transport.is_connected().await {
            self.set_state(SessionState::NotConnected);
            if !(self.options.reconnect_on_demand && self.reconnect().await) {
                warn!(command = %command.to_hex(), "Device not connected, dropping command");
                self.metrics.record_dropped();
                return;
            }
        }

        let start = Instant::now();
        match self.transport.write(command.as_bytes()).await {
            Ok(()) => {
                self.metrics.record_delivered(start.elapsed());
                debug!(command = %command.to_hex(), "Command delivered");
            }
            Err(e) => {
                warn!(error = %e, command = %command.to_hex(), "Failed to deliver command");
                self.metrics.record_failed(&e);
                if !self.transport.is_connected().await {
                    self.set_state(SessionState::NotConnected);
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Option<String> {
        self.set_state(SessionState::Disconnecting);
        let result = self.transport.disconnect().await;
        self.set_state(SessionState::Disconnected);

        match result {
            Ok(()) => {
                info!("Disconnected from device");
                None
            }
            Err(e) => {
                warn!(error = %e, "Error while disconnecting");
                self.metrics.record_error(&e);
                Some(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLight, MockProbe};
    use ledgate_types::{Color, encode_color, encode_power};

    fn quick_options() -> SessionOptions {
        SessionOptions::default().connect_retry(RetryConfig::none())
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("condition not reached");
    }

    fn spawn_mock(light: MockLight, options: SessionOptions) -> (Session, MockProbe) {
        let probe = light.probe();
        (Session::spawn(light, options), probe)
    }

    #[tokio::test]
    async fn test_delivers_exact_bytes_in_order() {
        let (session, probe) = spawn_mock(MockLight::new("mock"), quick_options());
        let handle = session.handle();

        handle.submit(encode_power(true)).unwrap();
        handle.submit(encode_color(Color::RED)).unwrap();
        handle.submit(encode_power(false)).unwrap();

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert!(report.drained);
        assert_eq!(
            probe.writes(),
            vec![
                vec![0x69, 0x96, 0x02, 0x01, 0x01],
                vec![0x69, 0x96, 0x05, 0x02, 0xFF, 0x00, 0x00],
                vec![0x69, 0x96, 0x02, 0x01, 0x00],
            ]
        );
        assert_eq!(report.metrics.delivered, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_arrival_order_matches_global_submission_order() {
        let (session, probe) = spawn_mock(
            MockLight::new("mock"),
            quick_options().queue_capacity(256),
        );
        // Records submissions in the order the calls completed
        let submitted = Arc::new(std::sync::Mutex::new(Vec::<Vec<u8>>::new()));

        let submitters = (0..8u8).map(|id| {
            let handle = session.handle();
            let submitted = Arc::clone(&submitted);
            tokio::spawn(async move {
                for seq in 0..20u8 {
                    let command = encode_color(Color::new(id, seq, 0));
                    {
                        let mut log = submitted.lock().unwrap();
                        handle.submit(command.clone()).unwrap();
                        log.push(command.as_bytes().to_vec());
                    }
                    tokio::task::yield_now().await;
                }
            })
        });
        for result in futures::future::join_all(submitters).await {
            result.unwrap();
        }

        session.shutdown(Duration::from_secs(5)).await;

        let expected = submitted.lock().unwrap().clone();
        assert_eq!(expected.len(), 160);
        assert_eq!(probe.writes(), expected);
    }

    #[tokio::test]
    async fn test_drops_commands_when_not_connected() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock").unreachable().build(),
            quick_options(),
        );
        let handle = session.handle();

        assert!(handle.submit(encode_power(true)).is_ok());
        assert!(handle.submit(encode_color(Color::BLUE)).is_ok());

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(probe.write_attempts(), 0);
        assert_eq!(probe.connect_calls(), 1);
        assert_eq!(report.metrics.dropped_not_connected, 2);
        assert!(report.metrics.last_error.is_some());
    }

    #[tokio::test]
    async fn test_lost_link_drops_later_commands() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock").drop_after_writes(1).build(),
            quick_options(),
        );
        let handle = session.handle();

        handle.submit(encode_power(true)).unwrap();
        handle.submit(encode_power(false)).unwrap();

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(probe.writes(), vec![vec![0x69, 0x96, 0x02, 0x01, 0x01]]);
        assert_eq!(report.metrics.delivered, 1);
        assert_eq!(report.metrics.dropped_not_connected, 1);
        // No reconnect by default
        assert_eq!(probe.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_link_lost_between_commands_drops_later_ones() {
        let (session, probe) = spawn_mock(MockLight::new("mock"), quick_options());
        let handle = session.handle();

        handle.submit(encode_power(true)).unwrap();
        wait_for(|| probe.write_count() == 1).await;

        probe.drop_link();
        handle.submit(encode_power(false)).unwrap();

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(probe.writes(), vec![vec![0x69, 0x96, 0x02, 0x01, 0x01]]);
        assert_eq!(report.metrics.dropped_not_connected, 1);
        assert_eq!(probe.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_on_demand() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock").failing_connects(1).build(),
            quick_options().reconnect_on_demand(true),
        );
        let handle = session.handle();

        handle.submit(encode_power(true)).unwrap();

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(probe.connect_calls(), 2);
        assert_eq!(probe.write_count(), 1);
        assert_eq!(report.metrics.dropped_not_connected, 0);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_delivery() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock").fail_writes(true).build(),
            quick_options(),
        );
        let handle = session.handle();

        handle.submit(encode_power(true)).unwrap();
        wait_for(|| handle.metrics().failed == 1).await;
        assert_eq!(handle.state(), SessionState::Connected);

        probe.set_fail_writes(false);
        handle.submit(encode_power(false)).unwrap();

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(probe.writes(), vec![vec![0x69, 0x96, 0x02, 0x01, 0x00]]);
        assert_eq!(report.metrics.failed, 1);
        assert_eq!(report.metrics.delivered, 1);
    }

    #[tokio::test]
    async fn test_queue_full_rejects_new_commands() {
        let (session, _probe) = spawn_mock(MockLight::new("mock"), quick_options().queue_capacity(2));
        let handle = session.handle();

        // The session task has not run yet on this single-threaded runtime
        handle.submit(encode_power(true)).unwrap();
        handle.submit(encode_power(false)).unwrap();
        assert_eq!(
            handle.submit(encode_power(true)),
            Err(SubmitError::QueueFull { capacity: 2 })
        );

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert_eq!(report.metrics.submitted, 2);
        assert_eq!(report.metrics.rejected, 1);
        assert_eq!(report.metrics.delivered, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let (session, _probe) = spawn_mock(MockLight::new("mock"), quick_options().queue_capacity(0));
        assert_eq!(session.handle().capacity(), 1);
        session.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_pending_commands() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock")
                .write_latency(Duration::from_millis(100))
                .build(),
            quick_options(),
        );
        let handle = session.handle();

        for _ in 0..5 {
            handle.submit(encode_power(true)).unwrap();
        }

        let report = session.shutdown(Duration::from_secs(5)).await;
        assert!(report.drained);
        assert_eq!(report.abandoned, 0);
        assert_eq!(probe.write_count(), 5);
        assert_eq!(probe.disconnect_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_forces_disconnect_after_timeout() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock")
                .write_latency(Duration::from_secs(30))
                .build(),
            quick_options(),
        );
        let handle = session.handle();

        for _ in 0..3 {
            handle.submit(encode_power(true)).unwrap();
        }

        let report = session.shutdown(Duration::from_secs(1)).await;
        assert!(!report.drained);
        assert_eq!(report.abandoned, 3);
        assert_eq!(report.metrics.abandoned, 3);
        assert_eq!(probe.write_count(), 0);
        assert_eq!(probe.disconnect_calls(), 1);
        assert!(!probe.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_runs_once_when_never_connected() {
        let (session, probe) = spawn_mock(
            MockLight::builder("mock").unreachable().build(),
            quick_options(),
        );
        let handle = session.handle();

        let report = session.shutdown(Duration::from_secs(1)).await;
        assert!(report.disconnect_error.is_none());
        assert_eq!(probe.disconnect_calls(), 1);
        assert_eq!(handle.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_closed() {
        let (session, probe) = spawn_mock(MockLight::new("mock"), quick_options());
        let handle = session.handle();

        session.shutdown(Duration::from_secs(1)).await;

        assert_eq!(handle.submit(encode_power(true)), Err(SubmitError::Closed));
        assert_eq!(probe.write_count(), 0);
        assert!(handle.state().is_terminal());
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let (session, _probe) = spawn_mock(MockLight::new("mock"), quick_options());
        let handle = session.handle();
        let mut states = handle.subscribe_state();

        states
            .wait_for(|s| *s == SessionState::Connected)
            .await
            .unwrap();
        assert_eq!(handle.address(), "mock");

        session.shutdown(Duration::from_secs(1)).await;
        assert_eq!(handle.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_connect_reports_not_connected() {
        let (session, _probe) = spawn_mock(
            MockLight::builder("mock").unreachable().build(),
            quick_options(),
        );
        let mut states = session.handle().subscribe_state();

        states
            .wait_for(|s| *s == SessionState::NotConnected)
            .await
            .unwrap();
        session.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_dropping_all_handles_disconnects() {
        let light = MockLight::new("mock");
        let probe = light.probe();
        let Session { handle, task, .. } = Session::spawn(light, quick_options());

        drop(handle);
        let report = task.await.unwrap();
        assert!(report.drained);
        assert_eq!(probe.disconnect_calls(), 1);
    }

    #[test]
    fn test_state_display_and_serde() {
        assert_eq!(SessionState::NotConnected.to_string(), "not connected");
        assert_eq!(
            serde_json::to_string(&SessionState::NotConnected).unwrap(),
            "\"not_connected\""
        );
    }
}
