//! Fetch and write-back pipeline
//!
//! Walks the catalog's paginated listings, enriches playlist tracks with
//! batched audio-feature lookups, and writes a finished sequence back in
//! request-sized batches. All catalog access goes through [`CatalogApi`].

use mixwheel_common::models::{merge_features, MergeOutcome, Track};
use tracing::{debug, info, warn};

use crate::catalog::{
    CatalogApi, CatalogError, NewPlaylist, Playlist, MAX_ITEMS_PER_REQUEST, PAGE_LIMIT,
};

/// How write-back treats the playlist's existing contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Clear the playlist, then append the sequence
    Replace,
    /// Append the sequence after the existing items
    Append,
}

/// Every playlist visible to the token's user
///
/// Pages of [`PAGE_LIMIT`] are requested until an empty page comes back.
pub async fn fetch_all_playlists(
    api: &dyn CatalogApi,
    token: &str,
) -> Result<Vec<Playlist>, CatalogError> {
    let mut playlists = Vec::new();
    let mut offset = 0;

    loop {
        let page = api.playlists(token, PAGE_LIMIT, offset).await?;
        if page.items.is_empty() {
            break;
        }
        offset += page.items.len() as u32;
        playlists.extend(page.items);
    }

    info!(count = playlists.len(), "Fetched playlists");
    Ok(playlists)
}

/// Enrich one chunk of playlist tracks with their audio features
async fn enrich_chunk(
    api: &dyn CatalogApi,
    token: &str,
    tracks: Vec<Track>,
) -> Result<MergeOutcome, CatalogError> {
    let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
    let features = if ids.is_empty() {
        Vec::new()
    } else {
        api.audio_features(token, &ids).await?
    };
    Ok(merge_features(tracks, features))
}

/// Fetch a playlist's tracks merged with their audio features
///
/// Tracks with no id (local files) or no feature record are reported in
/// [`MergeOutcome::missing`]. Unavailable items (null track) are skipped.
/// Duplicates are kept; the sequencer collapses them.
pub async fn fetch_playlist_tracks(
    api: &dyn CatalogApi,
    token: &str,
    playlist_id: &str,
) -> Result<MergeOutcome, CatalogError> {
    let mut outcome = MergeOutcome::default();
    let mut offset = 0;

    loop {
        let page = api
            .playlist_items(token, playlist_id, PAGE_LIMIT, offset)
            .await?;
        let page_len = page.items.len();
        if page_len == 0 {
            break;
        }
        offset += page_len as u32;

        let tracks: Vec<Track> = page.items.into_iter().filter_map(|item| item.track).collect();
        if tracks.len() < page_len {
            debug!(
                skipped = page_len - tracks.len(),
                "Skipping unavailable playlist items"
            );
        }

        let mut remaining = tracks;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(MAX_ITEMS_PER_REQUEST));
            let chunk = std::mem::replace(&mut remaining, rest);
            outcome.extend(enrich_chunk(api, token, chunk).await?);
        }
    }

    if !outcome.missing.is_empty() {
        warn!(
            playlist_id,
            missing = outcome.missing.len(),
            "Some tracks have no audio features"
        );
    }
    info!(
        playlist_id,
        tracks = outcome.enriched.len(),
        "Fetched playlist tracks"
    );
    Ok(outcome)
}

/// Append uris in batches of at most [`MAX_ITEMS_PER_REQUEST`]
async fn append_in_batches(
    api: &dyn CatalogApi,
    token: &str,
    playlist_id: &str,
    uris: &[String],
) -> Result<(), CatalogError> {
    for batch in uris.chunks(MAX_ITEMS_PER_REQUEST) {
        api.add_playlist_items(token, playlist_id, batch).await?;
    }
    Ok(())
}

/// Write a sequence's uris to an existing playlist
pub async fn write_sequence(
    api: &dyn CatalogApi,
    token: &str,
    playlist_id: &str,
    uris: &[String],
    mode: WriteMode,
) -> Result<(), CatalogError> {
    if mode == WriteMode::Replace {
        api.replace_playlist_items(token, playlist_id, &[]).await?;
    }
    append_in_batches(api, token, playlist_id, uris).await?;

    info!(playlist_id, tracks = uris.len(), ?mode, "Wrote sequence to playlist");
    Ok(())
}

/// Create a new playlist for the token's user and fill it with `uris`
pub async fn create_and_fill(
    api: &dyn CatalogApi,
    token: &str,
    playlist: &NewPlaylist,
    uris: &[String],
) -> Result<Playlist, CatalogError> {
    let user = api.current_user(token).await?;
    let created = api.create_playlist(token, &user.id, playlist).await?;
    append_in_batches(api, token, &created.id, uris).await?;

    info!(
        playlist_id = %created.id,
        tracks = uris.len(),
        "Filled new playlist"
    );
    Ok(created)
}
