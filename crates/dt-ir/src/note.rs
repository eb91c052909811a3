//! The closed note catalogue.

use core::fmt;

/// Number of notes the generator can play.
pub const NOTE_COUNT: usize = 7;

/// One of the seven notes of the C major scale.
///
/// The catalogue is fixed; "no note selected" is expressed as
/// `Option<Note>::None` wherever a selection is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Note {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Note {
    /// All notes in table order.
    pub const ALL: [Note; NOTE_COUNT] = [
        Note::C,
        Note::D,
        Note::E,
        Note::F,
        Note::G,
        Note::A,
        Note::B,
    ];

    /// Position of this note in the note and blink tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Note at a table position, if the position is in range.
    pub const fn from_index(index: usize) -> Option<Note> {
        if index < NOTE_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Parse a note letter (`C`..`B`, either case).
    pub fn from_letter(letter: char) -> Option<Note> {
        match letter.to_ascii_uppercase() {
            'C' => Some(Note::C),
            'D' => Some(Note::D),
            'E' => Some(Note::E),
            'F' => Some(Note::F),
            'G' => Some(Note::G),
            'A' => Some(Note::A),
            'B' => Some(Note::B),
            _ => None,
        }
    }

    /// Upper-case letter name.
    pub const fn letter(self) -> char {
        match self {
            Note::C => 'C',
            Note::D => 'D',
            Note::E => 'E',
            Note::F => 'F',
            Note::G => 'G',
            Note::A => 'A',
            Note::B => 'B',
        }
    }

    /// Equal-tempered pitch of the note in the fifth octave (C5 = 523.25 Hz).
    ///
    /// This is the octave the stock tables are tuned for; the octave key
    /// doubles it.
    pub const fn frequency_hz(self) -> f32 {
        match self {
            Note::C => 523.25,
            Note::D => 587.33,
            Note::E => 659.26,
            Note::F => 698.46,
            Note::G => 783.99,
            Note::A => 880.00,
            Note::B => 987.77,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
