//! Two-sample key debouncer.

use dt_ir::Note;

use crate::keys::RawKeys;

/// Filter state of the key debouncer.
///
/// A channel's accepted value only moves when two consecutive raw samples
/// agree. There is no counter: the filter delays acceptance by exactly one
/// sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceState {
    /// Raw reading of the previous sample.
    pub unfiltered: RawKeys,
    /// Last reading confirmed by two agreeing samples.
    pub accepted: RawKeys,
    /// Set once the first sample has seeded the filter.
    pub seeded: bool,
}

/// Result of one debouncer sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyReading {
    pub note: Option<Note>,
    pub octave: bool,
    /// The accepted note or octave moved to a new value on this sample
    /// (always set on the first sample).
    ///
    /// Two agreeing samples that re-confirm the accepted value do not count
    /// as a change. This deliberately departs from flagging every agreeing
    /// sample, which would restart the blink counter on each sample while a
    /// key is held.
    pub changed: bool,
}

/// Debounces the note and octave channels independently.
#[derive(Clone, Debug, Default)]
pub struct Debouncer {
    state: DebounceState,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Currently accepted reading.
    pub fn accepted(&self) -> RawKeys {
        self.state.accepted
    }

    /// Feed one raw reading through the filter.
    pub fn sample(&mut self, raw: RawKeys) -> KeyReading {
        let state = &mut self.state;

        if !state.seeded {
            // The first sample has nothing to agree with: it becomes both the
            // previous raw reading and the accepted one.
            state.seeded = true;
            state.unfiltered = raw;
            state.accepted = raw;
            return KeyReading {
                note: raw.note,
                octave: raw.octave,
                changed: true,
            };
        }

        let mut changed = false;
        if raw.octave == state.unfiltered.octave {
            changed |= state.accepted.octave != raw.octave;
            state.accepted.octave = raw.octave;
        }
        if raw.note == state.unfiltered.note {
            changed |= state.accepted.note != raw.note;
            state.accepted.note = raw.note;
        }
        state.unfiltered = raw;

        KeyReading {
            note: state.accepted.note,
            octave: state.accepted.octave,
            changed,
        }
    }
}
