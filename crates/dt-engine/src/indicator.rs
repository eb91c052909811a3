//! Indicator blink timing.

use dt_ir::{Note, NoteTable, Ticks, INITIAL_BLINK_TICKS};

/// Level of the two indicator lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndicatorPhase {
    /// Both lines low.
    Off,
    /// Both lines high.
    OnPair,
}

impl IndicatorPhase {
    pub const fn toggled(self) -> Self {
        match self {
            IndicatorPhase::Off => IndicatorPhase::OnPair,
            IndicatorPhase::OnPair => IndicatorPhase::Off,
        }
    }

    pub const fn is_lit(self) -> bool {
        matches!(self, IndicatorPhase::OnPair)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndicatorState {
    /// Base ticks between toggles.
    pub threshold: Ticks,
    /// Ticks since the last toggle or threshold change.
    pub counter: u16,
    pub phase: IndicatorPhase,
}

impl Default for IndicatorState {
    fn default() -> Self {
        Self {
            threshold: INITIAL_BLINK_TICKS,
            counter: 0,
            // The lines are driven high before the loop starts.
            phase: IndicatorPhase::OnPair,
        }
    }
}

/// Counts base ticks and flips the indicator every `threshold` of them.
#[derive(Clone, Debug, Default)]
pub struct IndicatorScheduler {
    state: IndicatorState,
}

impl IndicatorScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &IndicatorState {
        &self.state
    }

    pub fn phase(&self) -> IndicatorPhase {
        self.state.phase
    }

    /// Process one base tick. Returns `true` when the phase flipped.
    pub fn tick<T: NoteTable>(
        &mut self,
        table: &T,
        selection_changed: bool,
        note: Option<Note>,
        octave: bool,
    ) -> bool {
        let state = &mut self.state;
        if selection_changed {
            state.threshold = table.lookup_blink_period(note, octave);
            state.counter = 0;
        }

        state.counter = state.counter.saturating_add(1);
        if state.counter >= state.threshold.get() {
            state.counter = 0;
            state.phase = state.phase.toggled();
            true
        } else {
            false
        }
    }
}
