//! Key/mode decoding
//!
//! The catalog reports a track's key as a pitch-class integer (0 = C,
//! 1 = C#, ... 11 = B) and its mode as 0 (minor) or 1 (major). This module
//! maps those raw encodings onto typed values and display labels.
//!
//! Decoding is a pure table lookup. Anything outside the valid domain is a
//! data-integrity fault in the upstream feature source and is reported as
//! [`Error::DataIntegrity`], never silently defaulted.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The twelve pitch classes, in catalog index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

const PITCH_CLASSES: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl PitchClass {
    /// Decode a catalog pitch-class index (0-11)
    pub fn from_index(index: i64) -> Result<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| PITCH_CLASSES.get(i).copied())
            .ok_or_else(|| {
                Error::DataIntegrity(format!("key index {} outside pitch-class range 0-11", index))
            })
    }

    /// Catalog index of this pitch class
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label, sharp spelling ("C#", not "Db")
    pub fn name(self) -> &'static str {
        KEY_NAMES[self.index()]
    }
}

/// Major/minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Minor,
    Major,
}

impl Mode {
    /// Decode a catalog mode index (0 = minor, 1 = major)
    pub fn from_index(index: i64) -> Result<Self> {
        match index {
            0 => Ok(Mode::Minor),
            1 => Ok(Mode::Major),
            other => Err(Error::DataIntegrity(format!(
                "mode index {} is neither 0 (minor) nor 1 (major)",
                other
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Minor => "Minor",
            Mode::Major => "Major",
        }
    }
}

/// Human-readable key and mode labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedKey {
    pub key_name: &'static str,
    pub mode_name: &'static str,
}

/// Decode raw key and mode indices into display labels
///
/// # Errors
/// [`Error::DataIntegrity`] if `key` is outside 0-11 or `mode` is not 0/1.
///
/// # Examples
/// ```
/// use mixwheel_common::decode_key_mode;
///
/// let decoded = decode_key_mode(1, 0).unwrap();
/// assert_eq!(decoded.key_name, "C#");
/// assert_eq!(decoded.mode_name, "Minor");
///
/// assert!(decode_key_mode(12, 1).is_err());
/// ```
pub fn decode_key_mode(key: i64, mode: i64) -> Result<DecodedKey> {
    Ok(DecodedKey {
        key_name: PitchClass::from_index(key)?.name(),
        mode_name: Mode::from_index(mode)?.name(),
    })
}
