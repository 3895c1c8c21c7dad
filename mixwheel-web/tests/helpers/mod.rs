//! Test Helper Utilities
//!
//! In-memory [`CatalogApi`] and fixtures shared by the mixwheel-web
//! integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mixwheel_common::config::Settings;
use mixwheel_common::models::{Artist, AudioFeatures, Track};
use mixwheel_web::catalog::{
    check_batch, CatalogApi, CatalogError, NewPlaylist, Page, Playlist, PlaylistItem, TracksRef,
    User,
};
use mixwheel_web::{build_router, AppState};

/// A catalog call the fake observed
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Playlists { limit: u32, offset: u32 },
    PlaylistItems { playlist_id: String, limit: u32, offset: u32 },
    AudioFeatures { ids: Vec<String> },
    CreatePlaylist { user_id: String, playlist: NewPlaylist },
    Replace { playlist_id: String, uris: Vec<String> },
    Add { playlist_id: String, uris: Vec<String> },
}

/// In-memory catalog recording every call
#[derive(Default)]
pub struct FakeCatalog {
    pub playlists: Vec<Playlist>,
    /// Playlist id to items; `None` models an unavailable track
    pub items: HashMap<String, Vec<Option<Track>>>,
    pub features: HashMap<String, AudioFeatures>,
    pub calls: Mutex<Vec<Call>>,
    pub reject_tokens: AtomicBool,
    /// Tokens seen on any call
    pub tokens: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(mut self, id: &str, name: &str, items: Vec<Option<Track>>) -> Self {
        self.playlists.push(playlist(id, name, items.len() as u32));
        self.items.insert(id.to_string(), items);
        self
    }

    pub fn with_features(mut self, features: Vec<AudioFeatures>) -> Self {
        for f in features {
            self.features.insert(f.id.clone(), f);
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the write-back calls, in order
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::CreatePlaylist { .. } | Call::Replace { .. } | Call::Add { .. }
                )
            })
            .collect()
    }

    fn record(&self, token: &str, call: Call) -> Result<(), CatalogError> {
        self.tokens.lock().unwrap().push(token.to_string());
        if self.reject_tokens.load(Ordering::SeqCst) {
            return Err(CatalogError::Unauthorized);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

fn page<T: Clone>(all: &[T], limit: u32, offset: u32) -> Page<T> {
    let items: Vec<T> = all
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();
    Page {
        items,
        next: None,
        total: Some(all.len() as u32),
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn current_user(&self, token: &str) -> Result<User, CatalogError> {
        self.tokens.lock().unwrap().push(token.to_string());
        if self.reject_tokens.load(Ordering::SeqCst) {
            return Err(CatalogError::Unauthorized);
        }
        Ok(User {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
        })
    }

    async fn playlists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, CatalogError> {
        self.record(token, Call::Playlists { limit, offset })?;
        Ok(page(&self.playlists, limit, offset))
    }

    async fn playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError> {
        self.record(
            token,
            Call::PlaylistItems {
                playlist_id: playlist_id.to_string(),
                limit,
                offset,
            },
        )?;
        let items = self
            .items
            .get(playlist_id)
            .ok_or_else(|| CatalogError::ApiError(404, "Not found".to_string()))?;
        let wrapped: Vec<PlaylistItem> = items
            .iter()
            .map(|track| PlaylistItem {
                track: track.clone(),
            })
            .collect();
        Ok(page(&wrapped, limit, offset))
    }

    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        check_batch(ids.len())?;
        self.record(token, Call::AudioFeatures { ids: ids.to_vec() })?;
        Ok(ids.iter().map(|id| self.features.get(id).cloned()).collect())
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<Playlist, CatalogError> {
        self.record(
            token,
            Call::CreatePlaylist {
                user_id: user_id.to_string(),
                playlist: playlist.clone(),
            },
        )?;
        Ok(Playlist {
            id: "created1".to_string(),
            name: playlist.name.clone(),
            description: Some(playlist.description.clone()),
            public: Some(playlist.public),
            collaborative: playlist.collaborative,
            owner: None,
            tracks: Some(TracksRef { total: 0 }),
        })
    }

    async fn replace_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        check_batch(uris.len())?;
        self.record(
            token,
            Call::Replace {
                playlist_id: playlist_id.to_string(),
                uris: uris.to_vec(),
            },
        )
    }

    async fn add_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        check_batch(uris.len())?;
        self.record(
            token,
            Call::Add {
                playlist_id: playlist_id.to_string(),
                uris: uris.to_vec(),
            },
        )
    }
}

pub fn playlist(id: &str, name: &str, total: u32) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        public: Some(false),
        collaborative: false,
        owner: None,
        tracks: Some(TracksRef { total }),
    }
}

pub fn track(id: &str, name: &str, artists: &[&str]) -> Track {
    Track {
        id: Some(id.to_string()),
        name: name.to_string(),
        artists: artists
            .iter()
            .map(|a| Artist {
                name: a.to_string(),
            })
            .collect(),
        uri: format!("spotify:track:{}", id),
        duration_ms: 180_000,
    }
}

pub fn local_track(name: &str, artist: &str) -> Track {
    Track {
        id: None,
        name: name.to_string(),
        artists: vec![Artist {
            name: artist.to_string(),
        }],
        uri: format!("spotify:local:{}", name),
        duration_ms: 180_000,
    }
}

pub fn features(id: &str, key: i64, mode: i64, tempo: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        key,
        mode,
        tempo,
        ..Default::default()
    }
}

pub fn test_settings() -> Settings {
    Settings {
        bind_address: "127.0.0.1".to_string(),
        port: 3001,
        client_id: "test-client".to_string(),
        redirect_uri: "http://127.0.0.1:3001/auth/callback".to_string(),
        api_base_url: "http://127.0.0.1:9/v1".to_string(),
        accounts_url: "https://accounts.example.com/authorize".to_string(),
        session_ttl_minutes: 60,
        log_level: "info".to_string(),
    }
}

pub fn setup_app(catalog: Arc<FakeCatalog>) -> axum::Router {
    build_router(AppState::new(catalog, test_settings()))
}
