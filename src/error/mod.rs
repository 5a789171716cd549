use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chain::ChainRpcError;
use crate::db::DbError;
use crate::services::payment_service::PaymentFailure;

/// API error type. Client-caused failures keep their message in the response
/// body; server-side failures are logged and answered with a generic body.
#[derive(Debug, Error)]
pub enum SonarError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Payment verification failed: {0}")]
    PaymentFailed(#[from] PaymentFailure),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Chain RPC error: {0}")]
    ChainRpc(#[from] ChainRpcError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SonarResult<T> = Result<T, SonarError>;

impl IntoResponse for SonarError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            SonarError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            SonarError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            SonarError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            SonarError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            SonarError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": msg }))
            }
            SonarError::PaymentFailed(failure) => match failure {
                // Transport trouble is our problem, not the caller's
                PaymentFailure::Rpc(detail) => {
                    tracing::error!("payment verification RPC failure: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "Payment verification unavailable" }),
                    )
                }
                _ => (
                    StatusCode::PAYMENT_REQUIRED,
                    json!({
                        "error": failure.to_string(),
                        "code": failure.code(),
                        "retryable": failure.is_retryable(),
                    }),
                ),
            },
            SonarError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            SonarError::ChainRpc(err) => {
                tracing::error!("chain RPC error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            SonarError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_their_status_codes() {
        let cases = [
            (
                SonarError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SonarError::Unauthorized("no key".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                SonarError::NotFound("missing".into()),
                StatusCode::NOT_FOUND,
            ),
            (SonarError::Conflict("taken".into()), StatusCode::CONFLICT),
            (
                SonarError::RateLimited("slow down".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn payment_failures_are_402_except_rpc_trouble() {
        let err = SonarError::PaymentFailed(PaymentFailure::TxReverted);
        assert_eq!(err.into_response().status(), StatusCode::PAYMENT_REQUIRED);

        let err = SonarError::PaymentFailed(PaymentFailure::Rpc("connection refused".into()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_are_500() {
        let err = SonarError::Internal("boom".into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
