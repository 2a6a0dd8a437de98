//! Error handling for the faucet server.

use axum::{http::StatusCode, response::IntoResponse, Json};
use faucet_engine::DispenseError;
use serde_json::json;
use thiserror::Error;

/// Faucet server error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid Ethereum address: {0}")]
    InvalidWalletAddress(String),

    #[error(transparent)]
    Dispense(#[from] DispenseError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            ApiError::InvalidWalletAddress(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Dispense(err) => match err {
                // Expected control-flow outcome, not a fault.
                DispenseError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
                // Recorded and surfaced; the request itself was bad or the
                // network rejected it.
                DispenseError::Broadcast(_) => (StatusCode::BAD_REQUEST, self.to_string()),
                // Upstream chain client unreachable during nonce bootstrap.
                DispenseError::NonceFetch(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
                // Unrecoverable: the engine cannot claim success without a
                // durable record. Operators must reconcile.
                DispenseError::LedgerWrite(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
            ApiError::ConfigError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use faucet_engine::ChainError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(ApiError::Dispense(DispenseError::RateLimited)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(ApiError::Dispense(DispenseError::Broadcast(ChainError::Rejected(
                "invalid address".into()
            )))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Dispense(DispenseError::NonceFetch(ChainError::Transport(
                "rpc unreachable".into()
            )))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::InvalidWalletAddress("0x123".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_ledger_faults_hide_details() {
        let err = ApiError::Dispense(DispenseError::LedgerWrite(faucet_engine::LedgerError::Io(
            std::io::Error::other("disk full"),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
