//! Harmonic mixing wheel
//!
//! Fixed 24-entry cycle of (key, mode) compatibility classes. The order
//! zig-zags around the Camelot wheel (1A, 1B, 2B, 2A, 3A, 3B, ...) so each
//! class shares either its number (relative major/minor) or its letter with
//! an adjacent number with the class before it. Downstream consumers rely on
//! classes being presented in exactly this order.

use serde::Serialize;

use crate::key::{Mode, PitchClass};

/// One (key, mode) bucket on the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CompatibilityClass {
    pub key: PitchClass,
    pub mode: Mode,
}

const fn class(key: PitchClass, mode: Mode) -> CompatibilityClass {
    CompatibilityClass { key, mode }
}

/// Wheel order used for grouping
pub const WHEEL: [CompatibilityClass; 24] = [
    class(PitchClass::GSharp, Mode::Minor), // 1A
    class(PitchClass::B, Mode::Major),      // 1B
    class(PitchClass::FSharp, Mode::Major), // 2B
    class(PitchClass::DSharp, Mode::Minor), // 2A
    class(PitchClass::ASharp, Mode::Minor), // 3A
    class(PitchClass::CSharp, Mode::Major), // 3B
    class(PitchClass::GSharp, Mode::Major), // 4B
    class(PitchClass::F, Mode::Minor),      // 4A
    class(PitchClass::C, Mode::Minor),      // 5A
    class(PitchClass::DSharp, Mode::Major), // 5B
    class(PitchClass::ASharp, Mode::Major), // 6B
    class(PitchClass::G, Mode::Minor),      // 6A
    class(PitchClass::D, Mode::Minor),      // 7A
    class(PitchClass::F, Mode::Major),      // 7B
    class(PitchClass::C, Mode::Major),      // 8B
    class(PitchClass::A, Mode::Minor),      // 8A
    class(PitchClass::E, Mode::Minor),      // 9A
    class(PitchClass::G, Mode::Major),      // 9B
    class(PitchClass::D, Mode::Major),      // 10B
    class(PitchClass::B, Mode::Minor),      // 10A
    class(PitchClass::FSharp, Mode::Minor), // 11A
    class(PitchClass::A, Mode::Major),      // 11B
    class(PitchClass::E, Mode::Major),      // 12B
    class(PitchClass::CSharp, Mode::Minor), // 12A
];

impl CompatibilityClass {
    /// Position of this class on the wheel (0-23)
    pub fn position(self) -> usize {
        use Mode::{Major, Minor};
        use PitchClass::*;

        match (self.key, self.mode) {
            (GSharp, Minor) => 0,
            (B, Major) => 1,
            (FSharp, Major) => 2,
            (DSharp, Minor) => 3,
            (ASharp, Minor) => 4,
            (CSharp, Major) => 5,
            (GSharp, Major) => 6,
            (F, Minor) => 7,
            (C, Minor) => 8,
            (DSharp, Major) => 9,
            (ASharp, Major) => 10,
            (G, Minor) => 11,
            (D, Minor) => 12,
            (F, Major) => 13,
            (C, Major) => 14,
            (A, Minor) => 15,
            (E, Minor) => 16,
            (G, Major) => 17,
            (D, Major) => 18,
            (B, Minor) => 19,
            (FSharp, Minor) => 20,
            (A, Major) => 21,
            (E, Major) => 22,
            (CSharp, Minor) => 23,
        }
    }

    /// Camelot notation, e.g. "8B" for C major
    pub fn camelot(self) -> String {
        let position = self.position();
        let number = position / 2 + 1;
        let letter = match self.mode {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        };
        format!("{}{}", number, letter)
    }

    /// Display label, e.g. "C# Minor"
    pub fn label(self) -> String {
        format!("{} {}", self.key.name(), self.mode.name())
    }
}
