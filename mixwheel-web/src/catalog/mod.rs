//! Remote music catalog access
//!
//! [`CatalogApi`] is the seam between the HTTP layer and the remote service.
//! [`SpotifyClient`] talks to the real Web API; tests substitute an
//! in-memory implementation.
//!
//! Every call takes the caller's OAuth access token. Tokens belong to the
//! user's session, not to the client, so one client serves all sessions.

use async_trait::async_trait;
use mixwheel_common::models::{AudioFeatures, Track};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod spotify;

pub use spotify::SpotifyClient;

/// Largest id/uri list the catalog accepts per request
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

/// Page size used when walking paginated listings
pub const PAGE_LIMIT: u32 = 50;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Access token missing, expired or revoked (HTTP 401)
    #[error("Access token rejected by catalog")]
    Unauthorized,

    /// Too many requests (HTTP 429) and retry budget exhausted
    #[error("Rate limited by catalog (retry after {0:?} s)")]
    RateLimited(Option<u64>),

    /// Catalog returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to parse response JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Caller passed more ids/uris than one request may carry
    #[error("Batch of {0} items exceeds the per-request limit of {1}")]
    BatchTooLarge(usize, usize),
}

/// Reject batches the catalog would refuse
pub fn check_batch(len: usize) -> Result<(), CatalogError> {
    if len > MAX_ITEMS_PER_REQUEST {
        Err(CatalogError::BatchTooLarge(len, MAX_ITEMS_PER_REQUEST))
    } else {
        Ok(())
    }
}

/// Catalog ids are base-62 strings
pub fn is_valid_catalog_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Paging object wrapping every list endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Public user object
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Track count reference embedded in simplified playlists
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TracksRef {
    pub total: u32,
}

/// Simplified playlist object
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub tracks: Option<TracksRef>,
}

/// Entry of a playlist listing; `track` is null for unavailable items
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// Body for creating a playlist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

/// Operations the service needs from the remote catalog
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// The user owning `token`
    async fn current_user(&self, token: &str) -> Result<User, CatalogError>;

    /// One page of the user's playlists
    async fn playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, CatalogError>;

    /// One page of a playlist's tracks
    async fn playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError>;

    /// Audio features for up to [`MAX_ITEMS_PER_REQUEST`] track ids
    ///
    /// Unknown ids come back as `None` in the corresponding slot.
    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError>;

    /// Create an empty playlist owned by `user_id`
    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<Playlist, CatalogError>;

    /// Replace a playlist's contents with up to 100 uris (empty clears it)
    async fn replace_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;

    /// Append up to 100 uris to a playlist
    async fn add_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;
}
