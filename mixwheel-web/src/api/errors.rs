//! User-facing error page

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ErrorPageQuery {
    pub code: Option<String>,
}

/// GET /error
///
/// An expired session goes straight back through authorization.
pub async fn error_page(Query(query): Query<ErrorPageQuery>) -> Response {
    match query.code.as_deref() {
        Some("unauthenticated") => Redirect::to("/auth").into_response(),
        Some("invalid_playlist") => (
            StatusCode::BAD_REQUEST,
            "Empty or invalid playlist ID received",
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occured",
        )
            .into_response(),
    }
}

pub fn error_routes() -> Router<AppState> {
    Router::new().route("/error", get(error_page))
}
