//! In-memory session store
//!
//! Sessions are keyed by a random UUID carried in the `mixwheel_session`
//! cookie. They hold the user's access token and the transient results of
//! the flow (fetched tracks, missing labels, sorted sequence) between page
//! loads. Nothing is persisted; a restart logs everyone out.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};
use mixwheel_common::config::MAX_SESSION_TTL_MINUTES;
use mixwheel_common::models::EnrichedTrack;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mixwheel_session";

/// Per-user flow state
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: Option<String>,
    pub authenticated: bool,
    /// Playlist chosen on the playlists page
    pub playlist_id: Option<String>,
    /// Enriched tracks of the chosen playlist, in playlist order
    pub tracks: Option<Vec<EnrichedTrack>>,
    /// "Artists - Title" labels of tracks without audio features
    pub missing: Vec<String>,
    /// Output of the sequencer
    pub sorted: Option<Vec<EnrichedTrack>>,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            access_token: None,
            authenticated: false,
            playlist_id: None,
            tracks: None,
            missing: Vec::new(),
            sorted: None,
            created_at: now,
            last_access: now,
        }
    }

    /// Access token, only if the session completed the OAuth flow
    pub fn token(&self) -> Option<&str> {
        if self.authenticated {
            self.access_token.as_deref()
        } else {
            None
        }
    }
}

/// Shared session map with idle expiry
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Store with the given idle timeout, clamped to `0..=MAX_SESSION_TTL_MINUTES`
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::minutes(ttl_minutes.clamp(0, MAX_SESSION_TTL_MINUTES)),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_access > self.ttl
    }

    /// Start a fresh session, dropping `previous` if given
    ///
    /// Expired sessions are pruned at the same time.
    pub async fn regenerate(&self, previous: Option<Uuid>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        if let Some(old) = previous {
            sessions.remove(&old);
        }
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_access <= self.ttl);
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "Pruned expired sessions");
        }
        sessions.insert(id, Session::new(now));
        id
    }

    /// Snapshot of a live session, refreshing its idle timer
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !self.is_expired(session, now) => {
                session.last_access = now;
                Some(session.clone())
            }
            Some(_) => {
                sessions.remove(&id);
                None
            }
            None => None,
        }
    }

    /// Apply `f` to a live session; returns `None` if it is gone or expired
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired = sessions
            .get(&id)
            .map(|s| self.is_expired(s, now))
            .unwrap_or(false);
        if expired {
            sessions.remove(&id);
            return None;
        }
        sessions.get_mut(&id).map(|session| {
            session.last_access = now;
            f(session)
        })
    }

    pub async fn destroy(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Session id from the request's Cookie header(s)
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Headers setting the session cookie
pub fn session_cookie(id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(SET_COOKIE, value);
    }
    headers
}

/// Headers expiring the session cookie
pub fn clear_session_cookie() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_static("mixwheel_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_regenerate_replaces_previous() {
        let store = SessionStore::new(60);
        let first = store.regenerate(None).await;
        let second = store.regenerate(Some(first)).await;

        assert_ne!(first, second);
        assert!(store.get(first).await.is_none());
        assert!(store.get(second).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_token_requires_authentication() {
        let store = SessionStore::new(60);
        let id = store.regenerate(None).await;

        store
            .update(id, |s| s.access_token = Some("tok".to_string()))
            .await
            .unwrap();
        assert_eq!(store.get(id).await.unwrap().token(), None);

        store.update(id, |s| s.authenticated = true).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().token(), Some("tok"));
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = SessionStore::new(1);
        let id = store.regenerate(None).await;
        store
            .update(id, |s| s.last_access = Utc::now() - Duration::minutes(5))
            .await
            .unwrap();

        assert!(store.get(id).await.is_none());
        assert!(store.is_empty().await);
        assert!(store.update(id, |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_clamped() {
        let store = SessionStore::new(i64::MAX);
        assert_eq!(store.ttl, Duration::minutes(MAX_SESSION_TTL_MINUTES));
        let id = store.regenerate(None).await;
        assert!(store.get(id).await.is_some());

        let store = SessionStore::new(i64::MIN);
        assert_eq!(store.ttl, Duration::zero());
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = SessionStore::new(60);
        let id = store.regenerate(None).await;
        store.destroy(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[test]
    fn test_cookie_round_trip() {
        let id = Uuid::new_v4();
        let set = session_cookie(id);
        let cookie_value = set
            .get(SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let mut request_headers = HeaderMap::new();
        request_headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}", cookie_value)).unwrap(),
        );
        assert_eq!(session_id_from_headers(&request_headers), Some(id));
    }

    #[test]
    fn test_garbage_cookie_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("mixwheel_session=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}
