//! Track and audio-feature models
//!
//! Shapes follow the catalog's JSON objects closely enough to deserialize
//! them directly; fields the sequencer never reads are kept so they can be
//! rendered and returned from the JSON API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::key::{Mode, PitchClass};
use crate::wheel::CompatibilityClass;
use crate::{Error, Result};

/// Simplified artist object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
}

/// A playlist track as listed by the catalog
///
/// `id` is absent for local files, which can never be matched to audio
/// features.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    pub fn artist_names(&self) -> Vec<&str> {
        self.artists.iter().map(|a| a.name.as_str()).collect()
    }

    /// "Artist A, Artist B - Title", used to report missing songs
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist_names().join(", "), self.name)
    }
}

/// Measured audio attributes for one track
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AudioFeatures {
    pub id: String,
    /// Pitch class 0-11
    pub key: i64,
    /// 0 = minor, 1 = major
    pub mode: i64,
    /// Beats per minute
    pub tempo: f64,
    #[serde(default)]
    pub danceability: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub valence: f64,
    #[serde(default)]
    pub acousticness: f64,
    #[serde(default)]
    pub instrumentalness: f64,
    #[serde(default)]
    pub liveness: f64,
    #[serde(default)]
    pub loudness: f64,
    #[serde(default)]
    pub speechiness: f64,
    #[serde(default)]
    pub time_signature: i64,
}

/// A track merged with its audio features; the unit the sequencer orders
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnrichedTrack {
    pub track: Track,
    #[serde(flatten)]
    pub features: AudioFeatures,
}

impl EnrichedTrack {
    pub fn new(track: Track, features: AudioFeatures) -> Self {
        Self { track, features }
    }

    /// Catalog identifier (taken from the feature record, which always has one)
    pub fn id(&self) -> &str {
        &self.features.id
    }

    pub fn tempo(&self) -> f64 {
        self.features.tempo
    }

    pub fn uri(&self) -> &str {
        &self.track.uri
    }

    /// Decode key and mode into the track's wheel class
    ///
    /// # Errors
    /// [`Error::DataIntegrity`] if the key/mode indices are out of range or
    /// the tempo is not a finite number.
    pub fn compatibility_class(&self) -> Result<CompatibilityClass> {
        if !self.features.tempo.is_finite() {
            return Err(Error::DataIntegrity(format!(
                "track {} has non-finite tempo {}",
                self.id(),
                self.features.tempo
            )));
        }
        Ok(CompatibilityClass {
            key: PitchClass::from_index(self.features.key)?,
            mode: Mode::from_index(self.features.mode)?,
        })
    }
}

/// Result of merging a batch of tracks with their feature lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Tracks with matching features, in input order
    pub enriched: Vec<EnrichedTrack>,
    /// Labels of tracks with no id or no matching feature record
    pub missing: Vec<String>,
}

impl MergeOutcome {
    pub fn extend(&mut self, other: MergeOutcome) {
        self.enriched.extend(other.enriched);
        self.missing.extend(other.missing);
    }
}

/// Pair each track with the feature record carrying the same id
///
/// `features` is the raw lookup response, in which unknown ids come back as
/// `None`. Unmatched tracks are reported in `missing`, never dropped
/// silently.
pub fn merge_features(tracks: Vec<Track>, features: Vec<Option<AudioFeatures>>) -> MergeOutcome {
    let by_id: HashMap<String, AudioFeatures> = features
        .into_iter()
        .flatten()
        .map(|f| (f.id.clone(), f))
        .collect();

    let mut outcome = MergeOutcome::default();
    for track in tracks {
        let matched = track.id.as_deref().and_then(|id| by_id.get(id)).cloned();
        match matched {
            Some(features) => outcome.enriched.push(EnrichedTrack::new(track, features)),
            None => outcome.missing.push(track.label()),
        }
    }
    outcome
}
