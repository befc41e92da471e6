//! # REST Handlers
//!
//! Request and response types and the handlers behind each route.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::admission::{AdmissionGate, build_gate};
use crate::config::{HttpServerConfig, RateLimitConfig};
use crate::domain::services::{RatioComparator, RatioOperands, RatioResult};
use crate::domain::value_objects::{DecimalValue, Verdict};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Error text for a body that is not a decodable request.
pub const DECODE_ERROR_MSG: &str = "Ошибка декодирования запроса.";

/// Error text for a request with a missing field.
pub const INVALID_REQUEST_MSG: &str = "Некорректный запрос";

/// Error text for unexpected server failures.
pub const INTERNAL_ERROR_MSG: &str = "internal server error";

// ============================================================================
// Application State
// ============================================================================

/// Shared state of the REST router.
#[derive(Clone)]
pub struct AppState {
    /// Ratio evaluator.
    pub comparator: RatioComparator,
    /// Per-caller admission gate for `/`.
    pub gate: Arc<dyn AdmissionGate>,
    /// Admission settings: rejection message, status and caller keying.
    pub rate_limit: RateLimitConfig,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .field("rate_limit", &self.rate_limit)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates state around an existing gate.
    #[must_use]
    pub fn new(
        gate: Arc<dyn AdmissionGate>,
        rate_limit: RateLimitConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            comparator: RatioComparator::new(),
            gate,
            rate_limit,
            request_timeout,
        }
    }

    /// Creates state from the HTTP server settings, building the gate they select.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if the rate limit is unusable.
    pub fn from_config(config: &HttpServerConfig) -> ApplicationResult<Self> {
        let gate = build_gate(&config.rate_limit)?;
        Ok(Self::new(gate, config.rate_limit.clone(), config.timeout))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Outcome flag of every JSON response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The request was computed.
    #[serde(rename = "OK")]
    Ok,
    /// The request failed; see `error`.
    #[serde(rename = "Error")]
    Error,
}

/// Body of a ratio comparison request.
///
/// Every field is optional at decode time so that a missing field can be
/// told apart from a malformed body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RatioRequest {
    /// First factor of X's numerator.
    #[serde(rename = "X1")]
    pub x1: Option<DecimalValue>,
    /// Denominator of X.
    #[serde(rename = "X2")]
    pub x2: Option<DecimalValue>,
    /// Second factor of X's numerator.
    #[serde(rename = "X3")]
    pub x3: Option<DecimalValue>,
    /// First factor of Y's numerator.
    #[serde(rename = "Y1")]
    pub y1: Option<DecimalValue>,
    /// Denominator of Y.
    #[serde(rename = "Y2")]
    pub y2: Option<DecimalValue>,
    /// Second factor of Y's numerator.
    #[serde(rename = "Y3")]
    pub y3: Option<DecimalValue>,
    /// Number of fractional digits to round to.
    #[serde(rename = "E")]
    pub digits: Option<i32>,
}

fn required<T>(value: Option<T>, name: &str) -> ApplicationResult<T> {
    value.ok_or_else(|| ApplicationError::validation(format!("missing field {name}")))
}

impl RatioRequest {
    /// Decodes a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Decode` if the body is not a JSON object of
    /// the expected shape.
    pub fn decode(body: &[u8]) -> ApplicationResult<Self> {
        serde_json::from_slice(body).map_err(|e| ApplicationError::decode(e.to_string()))
    }

    /// Checks every field is present and splits into operands and digits.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` naming the first missing field.
    pub fn into_operands(self) -> ApplicationResult<(RatioOperands, i32)> {
        let operands = RatioOperands {
            x1: required(self.x1, "X1")?,
            x2: required(self.x2, "X2")?,
            x3: required(self.x3, "X3")?,
            y1: required(self.y1, "Y1")?,
            y2: required(self.y2, "Y2")?,
            y3: required(self.y3, "Y3")?,
        };
        let digits = required(self.digits, "E")?;
        Ok((operands, digits))
    }
}

/// Successful comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatioResponse {
    /// Always `OK`.
    pub status: ResponseStatus,
    /// Rounded X ratio.
    #[serde(rename = "X")]
    pub x: DecimalValue,
    /// Rounded Y ratio.
    #[serde(rename = "Y")]
    pub y: DecimalValue,
    /// `T` when X equals Y, `F` otherwise.
    #[serde(rename = "IsEqual")]
    pub is_equal: Verdict,
}

impl From<&RatioResult> for RatioResponse {
    fn from(result: &RatioResult) -> Self {
        Self {
            status: ResponseStatus::Ok,
            x: result.x().clone(),
            y: result.y().clone(),
            is_equal: result.verdict(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Always `Error`.
    pub status: ResponseStatus,
    /// Error message.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error response.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `OK`.
    pub status: ResponseStatus,
    /// Crate version.
    pub version: &'static str,
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Decode(_) => (StatusCode::BAD_REQUEST, DECODE_ERROR_MSG.to_owned()),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST_MSG.to_owned()),
            Self::AdmissionRejected { message, status } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::TOO_MANY_REQUESTS),
                message,
            ),
            Self::Io(_) | Self::Configuration(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MSG.to_owned(),
            ),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Compares the two ratios described by the request body.
///
/// `GET /` and `POST /`
///
/// # Errors
///
/// Returns 400 for an undecodable body or a missing field. A zero denominator
/// is not an HTTP error: it yields 200 with an error body.
///
/// The computation runs on the blocking pool so that a large `E` cannot stall
/// the runtime and the request timeout still applies.
pub async fn compare_ratios(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApplicationError> {
    let request = RatioRequest::decode(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "request body not decodable");
    })?;
    let (operands, digits) = request.into_operands().inspect_err(|e| {
        tracing::warn!(error = %e, "incomplete request");
    })?;

    let comparator = state.comparator;
    let result = tokio::task::spawn_blocking(move || comparator.compute(&operands, digits))
        .await
        .map_err(|e| ApplicationError::internal(e.to_string()))?;
    if let Some(failure) = result.failure() {
        tracing::info!(error = %failure, digits, "ratio comparison failed");
        return Ok((StatusCode::OK, Json(ErrorResponse::new(failure.to_string()))).into_response());
    }

    tracing::debug!(
        x = %result.x(),
        y = %result.y(),
        verdict = %result.verdict(),
        digits,
        "ratios compared"
    );
    Ok(Json(RatioResponse::from(&result)).into_response())
}

/// Health check endpoint.
///
/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: ResponseStatus::Ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Body returned when a handler panics.
#[must_use]
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(INTERNAL_ERROR_MSG)),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod decoding {
        use super::*;

        #[test]
        fn string_and_number_fields() {
            let request = RatioRequest::decode(
                br#"{"X1":"1.5","X2":2,"X3":3.0,"Y1":"4.5","Y2":"6.0","Y3":"3.0","E":3}"#,
            )
            .unwrap();
            let (operands, digits) = request.into_operands().unwrap();
            assert_eq!(digits, 3);
            assert_eq!(operands.x2, DecimalValue::from(2));
            assert_eq!(operands.x3, "3".parse::<DecimalValue>().unwrap());
        }

        #[test]
        fn bare_numbers_are_exact() {
            let request = RatioRequest::decode(
                br#"{"X1":0.12345678901234567890123,"X2":123456789012345678901234567890,
                    "X3":1,"Y1":-98765432109876543210.98765432109876543210,"Y2":1,"Y3":1,"E":30}"#,
            )
            .unwrap();
            let (operands, _) = request.into_operands().unwrap();
            assert_eq!(operands.x1.to_string(), "0.12345678901234567890123");
            assert_eq!(operands.x2.to_string(), "123456789012345678901234567890");
            assert_eq!(operands.y1.to_string(), "-98765432109876543210.9876543210987654321");
        }

        #[test]
        fn malformed_json_is_decode_error() {
            assert!(RatioRequest::decode(b"{not json").unwrap_err().is_decode());
            assert!(RatioRequest::decode(b"").unwrap_err().is_decode());
        }

        #[test]
        fn bad_decimal_is_decode_error() {
            let err = RatioRequest::decode(br#"{"X1":"abc"}"#).unwrap_err();
            assert!(err.is_decode());
        }

        #[test]
        fn fractional_digits_is_decode_error() {
            let err = RatioRequest::decode(br#"{"E":1.5}"#).unwrap_err();
            assert!(err.is_decode());
        }

        #[test]
        fn missing_field_is_validation_error() {
            let request = RatioRequest::decode(
                br#"{"X1":"1","X2":"1","X3":"1","Y1":"1","Y3":"1","E":0}"#,
            )
            .unwrap();
            let err = request.into_operands().unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains("Y2"));
        }

        #[test]
        fn missing_digits_is_validation_error() {
            let request = RatioRequest::decode(
                br#"{"X1":"1","X2":"1","X3":"1","Y1":"1","Y2":"1","Y3":"1"}"#,
            )
            .unwrap();
            assert!(request.into_operands().unwrap_err().is_validation());
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn ratio_response_shape() {
            let response = RatioResponse {
                status: ResponseStatus::Ok,
                x: "1.500".parse().unwrap(),
                y: "1.5".parse().unwrap(),
                is_equal: Verdict::Equal,
            };
            assert_eq!(
                serde_json::to_string(&response).unwrap(),
                r#"{"status":"OK","X":"1.5","Y":"1.5","IsEqual":"T"}"#
            );
        }

        #[test]
        fn error_response_shape() {
            assert_eq!(
                serde_json::to_string(&ErrorResponse::new("division by zero")).unwrap(),
                r#"{"status":"Error","error":"division by zero"}"#
            );
        }

        #[test]
        fn errors_map_to_status() {
            let cases = [
                (ApplicationError::decode("x"), StatusCode::BAD_REQUEST),
                (ApplicationError::validation("x"), StatusCode::BAD_REQUEST),
                (
                    ApplicationError::admission_rejected("slow", 402),
                    StatusCode::PAYMENT_REQUIRED,
                ),
                (
                    ApplicationError::configuration("x"),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
                (
                    ApplicationError::internal("x"),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
            ];
            for (err, status) in cases {
                assert_eq!(err.into_response().status(), status);
            }
        }
    }
}
