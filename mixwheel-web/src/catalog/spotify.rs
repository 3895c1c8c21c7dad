//! Spotify Web API client
//!
//! Thin typed wrapper over the handful of endpoints the service uses:
//! current user, playlist listing, playlist items, audio features, playlist
//! creation and item write-back.
//!
//! A 429 response is retried once if the server's `Retry-After` is short;
//! anything longer is surfaced as [`CatalogError::RateLimited`].

use async_trait::async_trait;
use mixwheel_common::models::AudioFeatures;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{
    check_batch, CatalogApi, CatalogError, NewPlaylist, Page, Playlist, PlaylistItem, User,
};

const USER_AGENT: &str = concat!("mixwheel/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Longest `Retry-After` honoured in-process before giving up
const MAX_RETRY_WAIT_SECS: u64 = 5;

/// Field filter for playlist item listings; only what the sequencer needs
const PLAYLIST_ITEM_FIELDS: &str = "items(track(artists(name),name,id,duration_ms,uri)),next";

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeatures>>,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl SpotifyClient {
    /// Create a client against `base_url` (e.g. `https://api.spotify.com/v1`)
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::NetworkError(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::NetworkError(format!(
                "Base URL {} cannot carry a path",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL joined with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Send a request, retrying once on a short 429, and map error statuses
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, CatalogError> {
        let mut retried = false;
        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| CatalogError::NetworkError("Request body not cloneable".to_string()))?;

            tracing::debug!(method = %attempt.method(), url = %attempt.url(), "Catalog request");

            let response = self
                .http_client
                .execute(attempt)
                .await
                .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::UNAUTHORIZED => return Err(CatalogError::Unauthorized),
                StatusCode::TOO_MANY_REQUESTS => {
                    let wait = Self::retry_after_secs(response.headers());
                    match wait {
                        Some(secs) if !retried && secs <= MAX_RETRY_WAIT_SECS => {
                            tracing::warn!("Catalog rate limited, retrying in {}s", secs);
                            tokio::time::sleep(Duration::from_secs(secs)).await;
                            retried = true;
                        }
                        _ => return Err(CatalogError::RateLimited(wait)),
                    }
                }
                _ => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(CatalogError::ApiError(status.as_u16(), error_text));
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let request = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        self.execute(request)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }

    async fn send_json(
        &self,
        method: Method,
        token: &str,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, CatalogError> {
        let request = self
            .http_client
            .request(method, url)
            .bearer_auth(token)
            .json(body)
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        self.execute(request).await
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn current_user(&self, token: &str) -> Result<User, CatalogError> {
        self.get_json(token, self.endpoint(&["me"]), &[]).await
    }

    async fn playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, CatalogError> {
        self.get_json(
            token,
            self.endpoint(&["me", "playlists"]),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError> {
        self.get_json(
            token,
            self.endpoint(&["playlists", playlist_id, "tracks"]),
            &[
                ("fields", PLAYLIST_ITEM_FIELDS.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        check_batch(ids.len())?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response: AudioFeaturesResponse = self
            .get_json(
                token,
                self.endpoint(&["audio-features"]),
                &[("ids", ids.join(","))],
            )
            .await?;

        tracing::debug!(
            requested = ids.len(),
            found = response.audio_features.iter().flatten().count(),
            "Audio features lookup"
        );

        Ok(response.audio_features)
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<Playlist, CatalogError> {
        let body = serde_json::to_value(playlist)
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;
        let response = self
            .send_json(
                Method::POST,
                token,
                self.endpoint(&["users", user_id, "playlists"]),
                &body,
            )
            .await?;

        let created: Playlist = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        tracing::info!(playlist_id = %created.id, name = %created.name, "Created playlist");
        Ok(created)
    }

    async fn replace_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        check_batch(uris.len())?;
        self.send_json(
            Method::PUT,
            token,
            self.endpoint(&["playlists", playlist_id, "tracks"]),
            &json!({ "uris": uris }),
        )
        .await?;
        Ok(())
    }

    async fn add_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        check_batch(uris.len())?;
        self.send_json(
            Method::POST,
            token,
            self.endpoint(&["playlists", playlist_id, "tracks"]),
            &json!({ "uris": uris }),
        )
        .await?;
        Ok(())
    }
}
