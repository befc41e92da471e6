//! Admission control middleware.

use crate::api::rest::handlers::AppState;
use crate::application::error::ApplicationError;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;

/// Header carrying the client address set by a reverse proxy.
pub const X_REAL_IP: &str = "x-real-ip";

/// Key used when the caller address cannot be determined.
pub const UNKNOWN_CALLER: &str = "unknown";

/// Derives the admission key of a request.
///
/// The peer IP address from the connection, or the `X-Real-IP` header when
/// `trust_real_ip` is set and the header is present.
#[must_use]
pub fn caller_key(request: &Request, trust_real_ip: bool) -> String {
    if trust_real_ip {
        let forwarded = request
            .headers()
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_owned();
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || UNKNOWN_CALLER.to_owned(),
            |ConnectInfo(addr)| addr.ip().to_string(),
        )
}

/// Rejects callers the gate refuses before the handler runs.
pub async fn admission(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = caller_key(&request, state.rate_limit.trust_real_ip);
    if !state.gate.try_admit(&key) {
        tracing::warn!(caller = %key, "admission rejected");
        return ApplicationError::admission_rejected(
            state.rate_limit.msg.clone(),
            state.rate_limit.status,
        )
        .into_response();
    }
    next.run(request).await
}
