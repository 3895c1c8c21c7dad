//! Account connection (OAuth implicit grant) and session gate
//!
//! `/auth` starts a fresh session and sends the browser to the accounts
//! service. The token comes back in the URL fragment of `/auth/callback`;
//! the start page posts it to the server, which stores it in the session.
//!
//! [`auth_middleware`] guards the `/flow/*` and `/api/*` routes.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::session::{clear_session_cookie, session_cookie, session_id_from_headers, Session};
use crate::AppState;

use super::{ui, UNAUTHENTICATED_REDIRECT};

/// Permissions requested from the account owner
pub const OAUTH_SCOPES: &str = "user-read-email playlist-read-collaborative playlist-modify-public playlist-read-private playlist-modify-private";

/// Authenticated session attached to guarded requests by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub token: String,
    pub session: Session,
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackForm {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `/auth/fail?error=<code>` with the code query-encoded
pub(crate) fn fail_location(code: &str) -> String {
    let mut url = match Url::parse("http://localhost/auth/fail") {
        Ok(url) => url,
        Err(_) => return "/auth/fail".to_string(),
    };
    url.query_pairs_mut().append_pair("error", code);
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Accounts-service authorize URL for this deployment
pub(crate) fn authorize_url(state: &AppState) -> ApiResult<Url> {
    let settings = &state.settings;
    Url::parse_with_params(
        &settings.accounts_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "token"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", OAUTH_SCOPES),
        ],
    )
    .map_err(|e| ApiError::Internal(format!("Invalid accounts URL: {}", e)))
}

/// GET /auth
///
/// Discards any existing session and redirects to the authorize page.
pub async fn start_auth(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let url = authorize_url(&state)?;
    let previous = session_id_from_headers(&headers);
    let id = state.sessions.regenerate(previous).await;

    info!(session = %id, "Starting account authorization");
    Ok((session_cookie(id), Redirect::to(url.as_str())).into_response())
}

/// GET /auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers) {
        state.sessions.destroy(id).await;
        info!(session = %id, "Session destroyed");
    }
    (clear_session_cookie(), Redirect::to("/")).into_response()
}

/// GET /auth/callback
///
/// Renders the start page, whose script posts the fragment token back.
pub async fn callback_page(Query(query): Query<ErrorQuery>) -> Response {
    if let Some(code) = query.error {
        warn!(code = %code, "Authorization refused");
        return Redirect::to(&fail_location(&code)).into_response();
    }
    ui::start_page().into_response()
}

/// POST /auth/callback
pub async fn receive_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ErrorQuery>,
    Form(form): Form<CallbackForm>,
) -> Response {
    if let Some(code) = query.error {
        return Redirect::to(&fail_location(&code)).into_response();
    }

    let token = match form.access_token.filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => return Redirect::to(&fail_location("unexpected")).into_response(),
    };

    let store = |session: &mut Session| {
        session.access_token = Some(token.clone());
        session.authenticated = true;
    };

    // The session may have expired while the user was on the accounts page
    let existing = match session_id_from_headers(&headers) {
        Some(id) => state.sessions.update(id, store).await.map(|_| id),
        None => None,
    };

    match existing {
        Some(id) => {
            info!(session = %id, "Account connected");
            Redirect::to("/auth/success").into_response()
        }
        None => {
            let id = state.sessions.regenerate(None).await;
            state.sessions.update(id, store).await;
            info!(session = %id, "Account connected with new session");
            (session_cookie(id), Redirect::to("/auth/success")).into_response()
        }
    }
}

/// GET /auth/fail
pub async fn auth_failed(Query(query): Query<ErrorQuery>) -> (StatusCode, &'static str) {
    match query.error.as_deref() {
        Some("unexpected") => (StatusCode::BAD_REQUEST, "Unexpected parameter encountered"),
        Some("access_denied") => (StatusCode::BAD_REQUEST, "Access denied to Spotify account"),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to connect Spotify account",
        ),
    }
}

/// GET /auth/success
pub async fn auth_succeeded(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let authenticated = match session_id_from_headers(&headers) {
        Some(id) => state
            .sessions
            .get(id)
            .await
            .map(|s| s.token().is_some())
            .unwrap_or(false),
        None => false,
    };

    if authenticated {
        Redirect::to("/flow/playlists")
    } else {
        Redirect::to(UNAUTHENTICATED_REDIRECT)
    }
}

/// Reject requests without an authenticated session
///
/// On success the session snapshot is attached as a [`CurrentSession`]
/// extension for the handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match session_id_from_headers(request.headers()) {
        Some(id) => state.sessions.get(id).await.and_then(|session| {
            let token = session.token()?.to_string();
            Some(CurrentSession { id, token, session })
        }),
        None => None,
    };

    match current {
        Some(current) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        None => {
            warn!(path = %request.uri().path(), "Unauthenticated request");
            Redirect::to(UNAUTHENTICATED_REDIRECT).into_response()
        }
    }
}

/// Build account connection routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(start_auth))
        .route("/auth/logout", get(logout))
        .route("/auth/callback", get(callback_page).post(receive_token))
        .route("/auth/fail", get(auth_failed))
        .route("/auth/success", get(auth_succeeded))
}
