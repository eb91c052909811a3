//! Read-only note and blink tables.

use crate::note::{Note, NOTE_COUNT};
use crate::profile::{NoteProfile, SAMPLES_PER_CYCLE};
use crate::timing::Ticks;

/// Source of per-note waveform profiles and indicator blink periods.
pub trait NoteTable {
    /// Waveform profile of a note.
    fn lookup_profile(&self, note: Note) -> &NoteProfile;

    /// Blink period for a selection. `None` has its own entry; the octave
    /// flag selects the second-octave region of the table.
    fn lookup_blink_period(&self, note: Option<Note>, octave: bool) -> Ticks;
}

impl<T: NoteTable + ?Sized> NoteTable for &T {
    fn lookup_profile(&self, note: Note) -> &NoteProfile {
        (**self).lookup_profile(note)
    }

    fn lookup_blink_period(&self, note: Option<Note>, octave: bool) -> Ticks {
        (**self).lookup_blink_period(note, octave)
    }
}

/// Blink table length: one "none" entry plus two octaves of notes.
pub const BLINK_ENTRIES: usize = 1 + 2 * NOTE_COUNT;

/// Sine profiles of C5..B5 for an 8 MHz clock.
#[rustfmt::skip]
pub const DIATONIC_PROFILES: [NoteProfile; NOTE_COUNT] = [
    NoteProfile::new(764, [382, 489, 584, 661, 709, 726, 709, 661, 584, 489, 382, 276, 180, 104, 55, 38, 55, 104, 180, 276]),
    NoteProfile::new(681, [341, 435, 521, 588, 632, 647, 632, 588, 521, 435, 341, 246, 160, 93, 49, 34, 49, 93, 160, 246]),
    NoteProfile::new(607, [303, 388, 464, 524, 563, 576, 563, 524, 464, 388, 303, 219, 143, 82, 44, 30, 44, 82, 143, 219]),
    NoteProfile::new(573, [286, 366, 438, 495, 531, 544, 531, 495, 438, 366, 286, 207, 135, 78, 41, 29, 41, 78, 135, 207]),
    NoteProfile::new(510, [255, 326, 390, 441, 473, 485, 473, 441, 390, 326, 255, 184, 120, 69, 37, 26, 37, 69, 120, 184]),
    NoteProfile::new(455, [227, 290, 348, 393, 422, 432, 422, 393, 348, 290, 227, 164, 107, 62, 33, 23, 33, 62, 107, 164]),
    NoteProfile::new(405, [202, 259, 310, 350, 376, 385, 376, 350, 310, 259, 202, 146, 95, 55, 29, 20, 29, 55, 95, 146]),
];

/// Base ticks between indicator toggles: none, C..B, then C..B one octave up.
pub const BLINK_PERIODS: [u16; BLINK_ENTRIES] = [
    977, 244, 194, 154, 122, 109, 86, 69, 61, 48, 38, 31, 27, 22, 17,
];

static STOCK_PROFILES: [NoteProfile; NOTE_COUNT] = DIATONIC_PROFILES;
static STOCK_BLINK: [u16; BLINK_ENTRIES] = BLINK_PERIODS;

/// Position of a selection in a blink table laid out like [`BLINK_PERIODS`].
pub const fn blink_index(note: Option<Note>, octave: bool) -> usize {
    match note {
        None => 0,
        Some(note) => note.index() + 1 + if octave { NOTE_COUNT } else { 0 },
    }
}

/// A note table held by value.
///
/// [`DiatonicTable::stock`] is the table the board ships with; tables built
/// by [`crate::synthesize_table`] target other clocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiatonicTable {
    profiles: [NoteProfile; NOTE_COUNT],
    blink: [u16; BLINK_ENTRIES],
}

impl DiatonicTable {
    pub const fn new(profiles: [NoteProfile; NOTE_COUNT], blink: [u16; BLINK_ENTRIES]) -> Self {
        Self { profiles, blink }
    }

    /// The 8 MHz C5..B5 table.
    pub const fn stock() -> Self {
        Self::new(DIATONIC_PROFILES, BLINK_PERIODS)
    }

    pub fn profiles(&self) -> &[NoteProfile; NOTE_COUNT] {
        &self.profiles
    }

    pub fn blink_periods(&self) -> &[u16; BLINK_ENTRIES] {
        &self.blink
    }
}

impl Default for DiatonicTable {
    fn default() -> Self {
        Self::stock()
    }
}

impl NoteTable for DiatonicTable {
    fn lookup_profile(&self, note: Note) -> &NoteProfile {
        &self.profiles[note.index()]
    }

    fn lookup_blink_period(&self, note: Option<Note>, octave: bool) -> Ticks {
        Ticks(self.blink[blink_index(note, octave)])
    }
}

/// Zero-sized handle on the stock tables, for firmware that wants them in
/// flash rather than copied into RAM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StockTable;

impl NoteTable for StockTable {
    fn lookup_profile(&self, note: Note) -> &NoteProfile {
        &STOCK_PROFILES[note.index()]
    }

    fn lookup_blink_period(&self, note: Option<Note>, octave: bool) -> Ticks {
        Ticks(STOCK_BLINK[blink_index(note, octave)])
    }
}

const _: () = assert!(SAMPLES_PER_CYCLE % 2 == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_uses_first_entry_regardless_of_octave() {
        let table = DiatonicTable::stock();
        assert_eq!(table.lookup_blink_period(None, false), Ticks(977));
        assert_eq!(table.lookup_blink_period(None, true), Ticks(977));
    }

    #[test]
    fn octave_selects_second_region() {
        let table = DiatonicTable::stock();
        assert_eq!(table.lookup_blink_period(Some(Note::C), false), Ticks(244));
        assert_eq!(table.lookup_blink_period(Some(Note::C), true), Ticks(61));
        assert_eq!(table.lookup_blink_period(Some(Note::B), false), Ticks(69));
        assert_eq!(table.lookup_blink_period(Some(Note::B), true), Ticks(17));
    }

    #[test]
    fn blink_gets_faster_with_pitch() {
        let table = DiatonicTable::stock();
        let mut last = u16::MAX;
        for octave in [false, true] {
            for note in Note::ALL {
                let ticks = table.lookup_blink_period(Some(note), octave).get();
                assert!(ticks < last, "{}{} blinks slower than the note below", note, octave);
                last = ticks;
            }
        }
    }

    #[test]
    fn periods_descend_with_pitch() {
        for pair in DIATONIC_PROFILES.windows(2) {
            assert!(pair[0].period > pair[1].period);
        }
    }

    #[test]
    fn samples_fit_under_period() {
        for profile in &DIATONIC_PROFILES {
            assert!(profile.peak() < profile.period);
            assert!(profile.trough() > 0);
        }
    }

    #[test]
    fn stock_table_matches_owned_table() {
        let owned = DiatonicTable::stock();
        for (note, profile) in Note::ALL.into_iter().zip(owned.profiles()) {
            assert_eq!(owned.lookup_profile(note), profile);
            assert_eq!(StockTable.lookup_profile(note), profile);
            for octave in [false, true] {
                assert_eq!(
                    owned.lookup_blink_period(Some(note), octave),
                    StockTable.lookup_blink_period(Some(note), octave)
                );
            }
        }
    }
}
