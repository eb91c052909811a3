//! Raw key line decoding.

use dt_ir::{Note, NOTE_COUNT};
use heapless::Vec;

/// Bit of the octave line in [`KeyLines`].
const OCTAVE_BIT: u8 = 1 << 7;

/// Order in which note lines are evaluated; a later asserted line
/// overrides an earlier one, so C has the highest priority.
///
/// Pressing several keys at once therefore plays the lowest of them.
const SCAN_ORDER: [Note; NOTE_COUNT] = [
    Note::B,
    Note::A,
    Note::G,
    Note::F,
    Note::E,
    Note::D,
    Note::C,
];

/// Levels of the eight key input lines.
///
/// Bit `n` (0..7) is the line of the note with table index `n`, bit 7 is
/// the octave line. Lines are asserted low: a cleared bit means the key is
/// held down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyLines(u8);

impl KeyLines {
    /// All lines high: nothing pressed.
    pub const IDLE: KeyLines = KeyLines(0xFF);

    /// Wrap raw pin levels.
    pub const fn from_levels(levels: u8) -> Self {
        Self(levels)
    }

    /// Lines with exactly the given keys held down.
    pub fn pressed(notes: &[Note], octave: bool) -> Self {
        let mut lines = Self::IDLE;
        for &note in notes {
            lines = lines.press(note);
        }
        if octave {
            lines = lines.press_octave();
        }
        lines
    }

    pub const fn levels(self) -> u8 {
        self.0
    }

    /// Assert the line of `note`.
    pub const fn press(self, note: Note) -> Self {
        Self(self.0 & !(1 << note.index()))
    }

    /// Assert the octave line.
    pub const fn press_octave(self) -> Self {
        Self(self.0 & !OCTAVE_BIT)
    }

    pub const fn is_pressed(self, note: Note) -> bool {
        self.0 & (1 << note.index()) == 0
    }

    pub const fn octave_pressed(self) -> bool {
        self.0 & OCTAVE_BIT == 0
    }

    /// Decode the lines into a single raw reading.
    pub fn reading(self) -> RawKeys {
        let mut note = None;
        for candidate in SCAN_ORDER {
            if self.is_pressed(candidate) {
                note = Some(candidate);
            }
        }
        RawKeys {
            note,
            octave: self.octave_pressed(),
        }
    }

    /// Every asserted note line, in table order.
    pub fn asserted_notes(self) -> Vec<Note, NOTE_COUNT> {
        let mut notes = Vec::new();
        for note in Note::ALL {
            if self.is_pressed(note) {
                // Capacity equals the number of notes.
                let _ = notes.push(note);
            }
        }
        notes
    }
}

impl Default for KeyLines {
    fn default() -> Self {
        Self::IDLE
    }
}

/// A single, unfiltered reading of the keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawKeys {
    pub note: Option<Note>,
    pub octave: bool,
}

impl RawKeys {
    pub const fn new(note: Option<Note>, octave: bool) -> Self {
        Self { note, octave }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_lines_read_nothing() {
        assert_eq!(KeyLines::IDLE.reading(), RawKeys::new(None, false));
        assert!(KeyLines::IDLE.asserted_notes().is_empty());
    }

    #[test]
    fn single_key_and_octave() {
        let lines = KeyLines::pressed(&[Note::E], true);
        assert_eq!(lines.reading(), RawKeys::new(Some(Note::E), true));
    }

    #[test]
    fn lines_are_asserted_low() {
        // Only bit 2 (E) cleared.
        let lines = KeyLines::from_levels(0b1111_1011);
        assert_eq!(lines.reading(), RawKeys::new(Some(Note::E), false));
        let octave_only = KeyLines::from_levels(0b0111_1111);
        assert_eq!(octave_only.reading(), RawKeys::new(None, true));
    }

    #[test]
    fn lowest_pressed_note_wins() {
        let lines = KeyLines::pressed(&[Note::G, Note::D, Note::B], false);
        assert_eq!(lines.reading().note, Some(Note::D));

        let all = KeyLines::pressed(&Note::ALL, false);
        assert_eq!(all.reading().note, Some(Note::C));
    }

    #[test]
    fn asserted_notes_lists_every_line() {
        let lines = KeyLines::pressed(&[Note::A, Note::C], false);
        assert_eq!(lines.asserted_notes().as_slice(), &[Note::C, Note::A]);
    }
}
