//! # REST Routes
//!
//! Router configuration for the REST API.
//!
//! Requests pass through, outermost first: request id assignment, request id
//! propagation, tracing, panic capture, timeout, then admission control (on
//! `/` only) and the handler.

use crate::api::rest::handlers::{AppState, compare_ratios, health_check, panic_response};
use crate::api::rest::middleware::admission;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates the REST API router.
///
/// # Routes
///
/// - `GET /`, `POST /` - Ratio comparison, admission controlled
/// - `GET /health` - Health check
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .route("/", get(compare_ratios).post(compare_ratios))
        .route_layer(from_fn_with_state(Arc::clone(&state), admission))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &Request<Body>| {
                            let request_id = req
                                .headers()
                                .get("x-request-id")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("n/a");
                            tracing::info_span!(
                                "http_request",
                                method = %req.method(),
                                uri = %req.uri().path(),
                                request_id = %request_id,
                            )
                        })
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                )),
        )
}
