//! Track-sequencing engine
//!
//! Orders a playlist for continuous playback in four steps:
//!
//! 1. **Deduplicate** by track id, first occurrence wins.
//! 2. **Group** into wheel classes ([`WHEEL`] order), dropping empty classes.
//! 3. **Sort** each class by tempo, fastest first (stable).
//! 4. **Smooth boundaries**: for every class except the last, move the track
//!    whose tempo is closest to the first track of the next class to the end
//!    of its class.
//!
//! Step 4 is a single greedy forward pass. It fixes each boundary using only
//! the sorted contents of the current class and the untouched head of the
//! next one, so it is not a global tempo optimum.
//!
//! Everything here is synchronous and pure: owned input in, owned output out.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::models::EnrichedTrack;
use crate::wheel::{CompatibilityClass, WHEEL};
use crate::Result;

/// Tracks belonging to one wheel class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassGroup {
    pub class: CompatibilityClass,
    pub tracks: Vec<EnrichedTrack>,
}

/// Sequencer output: non-empty classes in wheel order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    pub groups: Vec<ClassGroup>,
}

impl Sequence {
    /// Tracks in playback order
    pub fn tracks(&self) -> impl Iterator<Item = &EnrichedTrack> {
        self.groups.iter().flat_map(|g| g.tracks.iter())
    }

    /// Flatten into playback order
    pub fn into_tracks(self) -> Vec<EnrichedTrack> {
        self.groups.into_iter().flat_map(|g| g.tracks).collect()
    }

    /// Playback URIs in order, for playlist write-back
    pub fn uris(&self) -> Vec<String> {
        self.tracks().map(|t| t.uri().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.tracks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Collapse repeated track ids, keeping the first occurrence
pub fn dedupe_by_id(tracks: Vec<EnrichedTrack>) -> Vec<EnrichedTrack> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id().to_string()))
        .collect()
}

/// Partition tracks into wheel classes, in wheel order, omitting empty classes
///
/// Within a class, tracks keep their input order.
///
/// # Errors
/// Fails on the first track whose key, mode or tempo is invalid.
pub fn group_by_class(tracks: Vec<EnrichedTrack>) -> Result<Vec<ClassGroup>> {
    let mut buckets: Vec<Vec<EnrichedTrack>> = vec![Vec::new(); WHEEL.len()];
    for track in tracks {
        let position = track.compatibility_class()?.position();
        buckets[position].push(track);
    }

    Ok(WHEEL
        .iter()
        .zip(buckets)
        .filter(|(_, tracks)| !tracks.is_empty())
        .map(|(class, tracks)| ClassGroup {
            class: *class,
            tracks,
        })
        .collect())
}

/// Sort tracks by tempo, fastest first; equal tempos keep their order
pub fn sort_by_tempo_desc(tracks: &mut [EnrichedTrack]) {
    tracks.sort_by(|a, b| b.tempo().total_cmp(&a.tempo()));
}

/// Index of the first track with the smallest tempo distance to `target`
fn closest_tempo_index(tracks: &[EnrichedTrack], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, track) in tracks.iter().enumerate() {
        let distance = (track.tempo() - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Move each class's best bridge track to the end of the class
///
/// Walks boundaries left to right. The last group has no successor and is
/// left alone.
pub fn smooth_boundaries(groups: &mut [ClassGroup]) {
    for i in 1..groups.len() {
        let (before, after) = groups.split_at_mut(i);
        let current = &mut before[i - 1].tracks;
        let Some(target) = after[0].tracks.first().map(EnrichedTrack::tempo) else {
            continue;
        };
        if let Some(index) = closest_tempo_index(current, target) {
            let bridge = current.remove(index);
            current.push(bridge);
        }
    }
}

/// Deduplicate, group, sort and smooth a collection of enriched tracks
///
/// The result is a permutation of the deduplicated input. Empty input gives
/// an empty sequence.
///
/// # Errors
/// [`crate::Error::DataIntegrity`] if any track carries an out-of-range key
/// or mode index, or a non-finite tempo.
///
/// # Examples
/// ```
/// use mixwheel_common::classify_and_sequence;
///
/// let sequence = classify_and_sequence(Vec::new()).unwrap();
/// assert!(sequence.is_empty());
/// ```
pub fn classify_and_sequence(tracks: Vec<EnrichedTrack>) -> Result<Sequence> {
    let input_len = tracks.len();
    let unique = dedupe_by_id(tracks);
    let unique_len = unique.len();

    let mut groups = group_by_class(unique)?;
    for group in &mut groups {
        sort_by_tempo_desc(&mut group.tracks);
    }
    smooth_boundaries(&mut groups);

    debug!(
        input = input_len,
        duplicates = input_len - unique_len,
        classes = groups.len(),
        "Sequenced tracks"
    );

    Ok(Sequence { groups })
}
