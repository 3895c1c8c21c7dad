//! Error types for mixwheel-web
//!
//! Handler failures convert into HTTP responses here. Most are JSON
//! `{"error": {"code", "message"}}` bodies; an expired or revoked catalog
//! token instead sends the browser back through the OAuth flow.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::catalog::CatalogError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Remote catalog failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// mixwheel-common error
    #[error("Common error: {0}")]
    Common(#[from] mixwheel_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use mixwheel_common::Error as CommonError;

        match self {
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Catalog(CatalogError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "CATALOG_UNAUTHORIZED")
            }
            ApiError::Catalog(CatalogError::RateLimited(_)) => {
                (StatusCode::TOO_MANY_REQUESTS, "CATALOG_RATE_LIMITED")
            }
            ApiError::Catalog(CatalogError::BatchTooLarge(..)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Catalog(_) => (StatusCode::BAD_GATEWAY, "CATALOG_ERROR"),
            ApiError::Common(CommonError::DataIntegrity(_)) => {
                (StatusCode::BAD_GATEWAY, "DATA_INTEGRITY")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::Catalog(CatalogError::Unauthorized)) {
            warn!("Catalog rejected access token, restarting authorization");
            return Redirect::to("/auth").into_response();
        }

        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            error!(code = error_code, "{}", self);
        } else {
            warn!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
