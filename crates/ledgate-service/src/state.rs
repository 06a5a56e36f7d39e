//! Application state shared across handlers.
//!
//! Handlers never touch the BLE link. All they hold is a [`SessionHandle`],
//! whose `submit` only enqueues, so no handler can block on radio I/O.

use std::sync::Arc;

use ledgate_core::SessionHandle;

/// Shared application state.
pub struct AppState {
    /// Front door to the device session.
    pub session: SessionHandle,
    /// Expected `Authorization` header value.
    password: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(session: SessionHandle, password: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            session,
            password: password.into(),
        })
    }

    /// The configured shared secret.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
