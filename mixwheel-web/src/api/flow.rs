//! Interactive flow pages: pick a playlist, inspect it, organize it

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use mixwheel_common::classify_and_sequence;
use serde::Deserialize;
use tracing::info;

use super::auth::CurrentSession;
use super::{ui, UNAUTHENTICATED_REDIRECT};
use crate::catalog::is_valid_catalog_id;
use crate::error::ApiResult;
use crate::pipeline;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TracksForm {
    #[serde(default)]
    pub playlist: Option<String>,
}

/// GET /flow/playlists
pub async fn playlists_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Html<String>> {
    let playlists = pipeline::fetch_all_playlists(state.catalog.as_ref(), &current.token).await?;
    Ok(ui::playlists_page(&playlists))
}

/// POST /flow/tracks
///
/// Fetches the chosen playlist with its audio features and keeps the result
/// in the session for the organize step.
pub async fn tracks_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<TracksForm>,
) -> ApiResult<Response> {
    let playlist_id = match form.playlist.map(|p| p.trim().to_string()) {
        Some(id) if is_valid_catalog_id(&id) => id,
        _ => return Ok(Redirect::to("/error?code=invalid_playlist").into_response()),
    };

    let outcome =
        pipeline::fetch_playlist_tracks(state.catalog.as_ref(), &current.token, &playlist_id)
            .await?;
    let page = ui::tracks_page(&outcome.enriched, &outcome.missing)?;

    let stored = state
        .sessions
        .update(current.id, |session| {
            session.playlist_id = Some(playlist_id);
            session.tracks = Some(outcome.enriched);
            session.missing = outcome.missing;
            session.sorted = None;
        })
        .await;

    match stored {
        Some(()) => Ok(page.into_response()),
        None => Ok(Redirect::to(UNAUTHENTICATED_REDIRECT).into_response()),
    }
}

/// GET /flow/tracks/organized
pub async fn organized_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Response> {
    let CurrentSession { id, session, .. } = current;
    let tracks = match session.tracks {
        Some(tracks) => tracks,
        None => return Ok(Redirect::to("/error").into_response()),
    };

    let sequence = classify_and_sequence(tracks)?;
    info!(
        session = %id,
        tracks = sequence.len(),
        classes = sequence.groups.len(),
        "Organized playlist"
    );

    let sorted = sequence.into_tracks();
    let page = ui::sorted_page(&sorted, &session.missing)?;

    let stored = state
        .sessions
        .update(id, |session| session.sorted = Some(sorted))
        .await;

    match stored {
        Some(()) => Ok(page.into_response()),
        None => Ok(Redirect::to(UNAUTHENTICATED_REDIRECT).into_response()),
    }
}

/// GET /flow/create
pub async fn create_page() -> Html<String> {
    ui::create_page()
}

/// Build flow routes (require an authenticated session)
pub fn flow_routes() -> Router<AppState> {
    Router::new()
        .route("/flow/playlists", get(playlists_page))
        .route("/flow/tracks", post(tracks_page))
        .route("/flow/tracks/organized", get(organized_page))
        .route("/flow/create", get(create_page))
}
