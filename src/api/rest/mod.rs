//! # REST API
//!
//! HTTP interface of `ratio-service`, built on axum.
//!
//! # Endpoints
//!
//! - `GET /` and `POST /` - Compare two rounded ratios (admission controlled)
//! - `GET /health` - Health check endpoint
//!
//! # Request
//!
//! ```json
//! {"X1": "1.5", "X2": "2.0", "X3": "3.0", "Y1": "4.5", "Y2": "6.0", "Y3": "3.0", "E": 3}
//! ```
//!
//! Decimal fields may be strings or bare JSON numbers.
//!
//! # Responses
//!
//! | Situation            | Status              | Body                                              |
//! |----------------------|---------------------|---------------------------------------------------|
//! | Success              | 200                 | `{"status":"OK","X":"2.25","Y":"2.25","IsEqual":"T"}` |
//! | Computation failure  | 200                 | `{"status":"Error","error":"division by zero"}`   |
//! | Undecodable body     | 400                 | `{"status":"Error","error":"Ошибка декодирования запроса."}` |
//! | Missing field        | 400                 | `{"status":"Error","error":"Некорректный запрос"}` |
//! | Caller over quota    | configured (429)    | `{"status":"Error","error":"<configured message>"}` |
//!
//! # Usage
//!
//! ```ignore
//! use decimal_ratio::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::from_config(&config.http_server)?);
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! let timeouts = ServeTimeouts::from_config(&config.http_server);
//! decimal_ratio::api::rest::server::serve(listener, router, timeouts, shutdown_signal()).await;
//! ```

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use handlers::{
    AppState, DECODE_ERROR_MSG, ErrorResponse, HealthResponse, INVALID_REQUEST_MSG, RatioRequest,
    RatioResponse, ResponseStatus,
};
pub use routes::create_router;
