//! # MixWheel Common Library
//!
//! Shared code for the MixWheel service, including:
//! - Track and audio-feature models
//! - Key/mode decoding
//! - The fixed harmonic mixing wheel
//! - The track-sequencing engine
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod sequencer;
pub mod wheel;

pub use error::{Error, Result};
pub use key::{decode_key_mode, DecodedKey, Mode, PitchClass};
pub use models::{AudioFeatures, EnrichedTrack, MergeOutcome, Track};
pub use sequencer::{classify_and_sequence, ClassGroup, Sequence};
pub use wheel::{CompatibilityClass, WHEEL};
