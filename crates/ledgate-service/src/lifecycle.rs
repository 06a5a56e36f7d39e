//! Process lifecycle: session first, then HTTP, then an orderly teardown.
//!
//! [`Lifecycle::run`] fixes the ordering the gateway depends on:
//!
//! 1. Spawn the device session (it starts connecting on its own task)
//! 2. Serve HTTP with a handle to that session, until the shutdown future fires
//! 3. Drain the session and disconnect the device, then return
//!
//! Because the router is only built from a live [`SessionHandle`], no request
//! can submit a command before the session exists.
//!
//! The caller binds the [`TcpListener`] before calling [`Lifecycle::run`], so
//! a bad bind address fails before the radio is touched. Connections the
//! kernel accepts into the backlog during that window wait unanswered until
//! the session is spawned and serving begins.
//!
//! [`SessionHandle`]: ledgate_core::SessionHandle

use std::future::Future;

use ledgate_core::{LightTransport, Session, ShutdownReport};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::api;
use crate::config::Config;
use crate::state::AppState;

/// Runs the gateway from a validated [`Config`].
#[derive(Debug)]
pub struct Lifecycle {
    config: Config,
}

impl Lifecycle {
    /// Create a lifecycle for an already validated configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until `shutdown` completes, then drain and disconnect.
    ///
    /// The session is shut down even if the server fails; the server error
    /// is returned after the device has been released.
    pub async fn run<T, F>(
        self,
        transport: T,
        listener: TcpListener,
        shutdown: F,
    ) -> std::io::Result<ShutdownReport>
    where
        T: LightTransport,
        F: Future<Output = ()> + Send + 'static,
    {
        let session = Session::spawn(transport, self.config.session_options());
        let state = AppState::new(session.handle(), self.config.auth.password.clone());
        let app = api::app(state);

        match listener.local_addr() {
            Ok(addr) => info!("Listening on {}", addr),
            Err(e) => warn!("Listening on unknown address: {}", e),
        }

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        if let Err(e) = &served {
            error!(error = %e, "HTTP server failed");
        }

        info!("HTTP server stopped, releasing device");
        let report = session
            .shutdown(self.config.session.drain_timeout())
            .await;

        if report.drained {
            info!(
                delivered = report.metrics.delivered,
                dropped = report.metrics.dropped_not_connected,
                failed = report.metrics.failed,
                "Device session drained"
            );
        } else {
            warn!(
                abandoned = report.abandoned,
                "Drain timed out, device was force-disconnected"
            );
        }

        served.map(|()| report)
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
