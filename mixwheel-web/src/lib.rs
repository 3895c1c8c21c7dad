//! mixwheel-web library
//!
//! Web front end for the harmonic track sequencer: connects a Spotify
//! account, loads a playlist with its audio features, orders it around the
//! mixing wheel and writes the result back.

use std::sync::Arc;

use axum::Router;
use mixwheel_common::config::Settings;

pub mod api;
pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod session;

use catalog::CatalogApi;
use session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Remote catalog client (shared by all sessions)
    pub catalog: Arc<dyn CatalogApi>,
    /// Per-browser flow state
    pub sessions: SessionStore,
    /// Resolved configuration
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: Arc<dyn CatalogApi>, settings: Settings) -> Self {
        let sessions = SessionStore::new(settings.session_ttl_minutes);
        Self {
            catalog,
            sessions,
            settings: Arc::new(settings),
        }
    }
}

/// Build application router
///
/// `/flow/*` and `/api/*` sit behind [`api::auth_middleware`]; account
/// connection, the error page and `/health` do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::response::Redirect;
    use axum::routing::get;
    use tower_http::trace::TraceLayer;

    // Protected routes (require an authenticated session)
    let protected = Router::new()
        .merge(api::flow_routes())
        .merge(api::playlist_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/", get(|| async { Redirect::to("/auth") }))
        .merge(api::auth_routes())
        .merge(api::error_routes())
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
