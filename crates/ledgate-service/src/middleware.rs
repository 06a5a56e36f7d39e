//! Password authentication for the gateway.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::api::AppError;
use crate::state::AppState;

/// Paths that are reachable without the password.
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Password authentication middleware.
///
/// The `Authorization` header must equal the configured secret exactly; no
/// scheme prefix is expected. Anything else is answered with 401 before the
/// handler runs, so a rejected request can never submit a command.
pub async fn require_password(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let provided = headers.get(AUTHORIZATION).map(|v| v.as_bytes());

    if let Some(provided) = provided
        && password_matches(state.password(), provided)
    {
        return next.run(request).await;
    }

    warn!(
        path = request.uri().path(),
        header_present = provided.is_some(),
        "Rejected unauthenticated request"
    );
    AppError::Unauthorized.into_response()
}

/// Constant-time comparison of the configured secret with a header value.
fn password_matches(expected: &str, provided: &[u8]) -> bool {
    // An empty secret would match an empty header
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(provided))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_matches() {
        assert!(password_matches("secret", b"secret"));
        assert!(!password_matches("secret", b"Secret"));
        assert!(!password_matches("secret", b"secret "));
        assert!(!password_matches("secret", b"Bearer secret"));
        assert!(!password_matches("secret", b""));
    }

    #[test]
    fn test_empty_password_never_matches() {
        assert!(!password_matches("", b""));
        assert!(!password_matches("", b"anything"));
    }

    #[test]
    fn test_health_is_public() {
        assert!(PUBLIC_PATHS.contains(&"/health"));
        assert!(!PUBLIC_PATHS.contains(&"/status"));
    }
}
