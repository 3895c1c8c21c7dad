//! Sequence export: JSON view and write-back to the catalog

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde::Deserialize;

use super::auth::{fail_location, CurrentSession};
use crate::catalog::NewPlaylist;
use crate::error::ApiResult;
use crate::pipeline::{self, WriteMode};
use crate::AppState;

/// Public web player address for a playlist
pub const PLAYLIST_WEB_URL: &str = "https://open.spotify.com/playlist/";

#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaylistForm {
    #[serde(default)]
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub playlist_description: Option<String>,
}

fn open_playlist(playlist_id: &str) -> Redirect {
    Redirect::to(&format!("{}{}", PLAYLIST_WEB_URL, playlist_id))
}

/// GET /api/songs
pub async fn sorted_songs(Extension(current): Extension<CurrentSession>) -> Response {
    match (current.session.playlist_id, current.session.sorted) {
        (Some(_), Some(sorted)) => Json(sorted).into_response(),
        _ => Redirect::to("/error").into_response(),
    }
}

/// GET /api/overwrite-playlist
///
/// Replaces the source playlist's contents with the organized sequence.
/// Stays a GET so the organized page can link to it; it only writes the
/// playlist chosen and organized earlier in the same session.
pub async fn overwrite_playlist(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Response> {
    let (playlist_id, sorted) = match (current.session.playlist_id, current.session.sorted) {
        (Some(id), Some(sorted)) => (id, sorted),
        _ => return Ok(Redirect::to("/error").into_response()),
    };

    let uris: Vec<String> = sorted.iter().map(|t| t.uri().to_string()).collect();
    pipeline::write_sequence(
        state.catalog.as_ref(),
        &current.token,
        &playlist_id,
        &uris,
        WriteMode::Replace,
    )
    .await?;

    Ok(open_playlist(&playlist_id).into_response())
}

/// POST /api/create-playlist
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<CreatePlaylistForm>,
) -> ApiResult<Response> {
    let sorted = match current.session.sorted {
        Some(sorted) => sorted,
        None => return Ok(Redirect::to("/error").into_response()),
    };

    let (name, description) = match (form.playlist_name, form.playlist_description) {
        (Some(name), Some(description)) => (name, description),
        _ => return Ok(Redirect::to(&fail_location("unexpected")).into_response()),
    };

    let new_playlist = NewPlaylist {
        name,
        description,
        public: false,
        collaborative: false,
    };
    let uris: Vec<String> = sorted.iter().map(|t| t.uri().to_string()).collect();
    let created =
        pipeline::create_and_fill(state.catalog.as_ref(), &current.token, &new_playlist, &uris)
            .await?;

    Ok(open_playlist(&created.id).into_response())
}

/// Build export routes (require an authenticated session)
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(sorted_songs))
        .route("/api/overwrite-playlist", get(overwrite_playlist))
        .route("/api/create-playlist", post(create_playlist))
}
