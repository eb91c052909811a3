//! The main control loop.

use dt_ir::{NoteTable, KEY_SAMPLE_DIVIDER};

use crate::debounce::{Debouncer, KeyReading};
use crate::hal::Hardware;
use crate::indicator::{IndicatorPhase, IndicatorScheduler};
use crate::keys::{KeyLines, RawKeys};
use crate::signal::TickSignals;
use crate::waveform::{DriveValues, WaveformCursor, WaveformScheduler};

/// Tunables of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Base ticks between two key samples. `1` samples on every tick.
    pub key_sample_divider: u8,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            key_sample_divider: KEY_SAMPLE_DIVIDER,
        }
    }
}

/// One key sample taken during a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySample {
    pub lines: KeyLines,
    pub reading: KeyReading,
}

/// What a single poll did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Output stage state applied at the top of the poll.
    pub output_enabled: bool,
    /// Values prepared for the next waveform period.
    pub drive: Option<DriveValues>,
    /// A base tick was consumed.
    pub base_tick: bool,
    /// Key sample taken on this base tick, if it was a sampling tick.
    pub keys: Option<KeySample>,
    /// New indicator phase, when it toggled.
    pub indicator: Option<IndicatorPhase>,
}

impl Dispatch {
    /// Nothing was pending.
    pub fn is_idle(&self) -> bool {
        self.drive.is_none() && !self.base_tick
    }
}

/// Cooperative dispatcher between the tick signals and the schedulers.
///
/// Owns all scheduler state; the only state shared with interrupts lives in
/// [`TickSignals`].
pub struct ControlLoop<T> {
    table: T,
    config: LoopConfig,
    debouncer: Debouncer,
    waveform: WaveformScheduler,
    indicator: IndicatorScheduler,
    ticks_since_sample: u8,
}

impl<T: NoteTable> ControlLoop<T> {
    pub fn new(table: T, config: LoopConfig) -> Self {
        let divider = config.key_sample_divider.max(1);
        Self {
            table,
            config: LoopConfig {
                key_sample_divider: divider,
            },
            debouncer: Debouncer::new(),
            waveform: WaveformScheduler::new(),
            indicator: IndicatorScheduler::new(),
            // Sample on the very first base tick.
            ticks_since_sample: divider - 1,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Debounced selection.
    pub fn selection(&self) -> RawKeys {
        self.debouncer.accepted()
    }

    pub fn cursor(&self) -> &WaveformCursor {
        self.waveform.cursor()
    }

    pub fn indicator(&self) -> &IndicatorScheduler {
        &self.indicator
    }

    /// Run one loop iteration. Never blocks.
    ///
    /// The watchdog is fed first, on every call, whether or not a tick is
    /// pending.
    pub fn poll<H: Hardware + ?Sized>(&mut self, hw: &mut H, signals: &TickSignals) -> Dispatch {
        hw.feed_watchdog();

        let selection = self.debouncer.accepted();
        let output_enabled = selection.note.is_some();
        hw.set_output_enabled(output_enabled);

        let mut dispatch = Dispatch {
            output_enabled,
            ..Dispatch::default()
        };

        if signals.waveform.take() {
            let values = self.waveform.advance(&self.table, selection.note, selection.octave);
            signals.latch.prepare(values);
            dispatch.drive = Some(values);
        }

        if signals.base.take() {
            dispatch.base_tick = true;

            let mut changed = false;
            self.ticks_since_sample += 1;
            if self.ticks_since_sample >= self.config.key_sample_divider {
                self.ticks_since_sample = 0;
                let lines = hw.read_key_lines();
                let reading = self.debouncer.sample(lines.reading());
                changed = reading.changed;
                dispatch.keys = Some(KeySample { lines, reading });
            }

            let accepted = self.debouncer.accepted();
            if self.indicator.tick(&self.table, changed, accepted.note, accepted.octave) {
                let phase = self.indicator.phase();
                hw.set_indicator(phase);
                dispatch.indicator = Some(phase);
            }
        }

        dispatch
    }

    /// Firmware entry: poll forever.
    pub fn run<H: Hardware + ?Sized>(&mut self, hw: &mut H, signals: &TickSignals) -> ! {
        loop {
            self.poll(hw, signals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_ir::{DiatonicTable, Note, Ticks};

    #[derive(Default)]
    struct MockBoard {
        lines: KeyLines,
        output_enabled: Option<bool>,
        indicator: Vec<IndicatorPhase>,
        watchdog_feeds: u32,
        key_reads: u32,
    }

    impl Hardware for MockBoard {
        fn read_key_lines(&mut self) -> KeyLines {
            self.key_reads += 1;
            self.lines
        }

        fn set_output_enabled(&mut self, enabled: bool) {
            self.output_enabled = Some(enabled);
        }

        fn set_indicator(&mut self, phase: IndicatorPhase) {
            self.indicator.push(phase);
        }

        fn feed_watchdog(&mut self) {
            self.watchdog_feeds += 1;
        }
    }

    fn every_tick() -> LoopConfig {
        LoopConfig {
            key_sample_divider: 1,
        }
    }

    fn base_tick(
        ctl: &mut ControlLoop<DiatonicTable>,
        board: &mut MockBoard,
        signals: &TickSignals,
    ) -> Dispatch {
        signals.on_base_tick();
        ctl.poll(board, signals)
    }

    #[test]
    fn watchdog_fed_on_every_poll() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), every_tick());
        let mut board = MockBoard::default();
        let signals = TickSignals::new();

        ctl.poll(&mut board, &signals);
        for _ in 0..10 {
            let dispatch = ctl.poll(&mut board, &signals);
            assert!(dispatch.is_idle());
        }
        assert_eq!(board.watchdog_feeds, 11);
    }

    #[test]
    fn first_poll_seeds_from_keys() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), LoopConfig::default());
        let mut board = MockBoard {
            lines: KeyLines::pressed(&[Note::F], false),
            ..Default::default()
        };
        let signals = TickSignals::new();

        let dispatch = ctl.poll(&mut board, &signals);
        assert!(dispatch.base_tick);
        let sample = dispatch.keys.expect("first base tick samples the keys");
        assert!(sample.reading.changed);
        assert_eq!(ctl.selection().note, Some(Note::F));
        assert_eq!(ctl.indicator().state().threshold, Ticks(122));
        // Output enabling lags the selection by one poll.
        assert!(!dispatch.output_enabled);
        assert!(ctl.poll(&mut board, &signals).output_enabled);
    }

    #[test]
    fn keys_sampled_every_divider_ticks() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), LoopConfig::default());
        let mut board = MockBoard::default();
        let signals = TickSignals::new();
        signals.waveform.take();

        let sampled: Vec<bool> = (0..11)
            .map(|_| base_tick(&mut ctl, &mut board, &signals).keys.is_some())
            .collect();
        assert_eq!(
            sampled,
            [true, false, false, false, false, true, false, false, false, false, true]
        );
        assert_eq!(board.key_reads, 3);
    }

    #[test]
    fn glitch_does_not_reach_selection() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), every_tick());
        let mut board = MockBoard::default();
        let signals = TickSignals::new();
        signals.waveform.take();

        let script = [2usize, 2, 2, 5, 5, 2, 2];
        let mut accepted = Vec::new();
        for index in script {
            board.lines = KeyLines::pressed(&[Note::ALL[index]], false);
            base_tick(&mut ctl, &mut board, &signals);
            accepted.push(ctl.selection().note.map(|n| n.index()));
        }
        assert_eq!(accepted, [2usize, 2, 2, 2, 5, 5, 2].map(Some));
    }

    #[test]
    fn no_note_keeps_output_disabled_while_waveform_runs() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), every_tick());
        let mut board = MockBoard {
            lines: KeyLines::pressed(&[Note::C], false),
            ..Default::default()
        };
        let signals = TickSignals::new();

        ctl.poll(&mut board, &signals);
        assert!(ctl.poll(&mut board, &signals).output_enabled);

        board.lines = KeyLines::IDLE;
        base_tick(&mut ctl, &mut board, &signals);
        base_tick(&mut ctl, &mut board, &signals);
        assert_eq!(ctl.selection().note, None);

        for _ in 0..50 {
            signals.on_waveform_tick();
            let dispatch = ctl.poll(&mut board, &signals);
            assert!(dispatch.drive.is_some());
            assert!(!dispatch.output_enabled);
            assert_eq!(board.output_enabled, Some(false));
        }
    }

    #[test]
    fn waveform_tick_prepares_next_sample() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), every_tick());
        let mut board = MockBoard {
            lines: KeyLines::pressed(&[Note::G], false),
            ..Default::default()
        };
        let signals = TickSignals::new();
        // Seed the selection without consuming a waveform sample for G.
        signals.waveform.take();
        ctl.poll(&mut board, &signals);

        signals.on_waveform_tick();
        let dispatch = ctl.poll(&mut board, &signals);
        let drive = dispatch.drive.expect("waveform tick pending");
        assert_eq!(drive, DriveValues::new(510, 255));
        assert_eq!(signals.latch.take_prepared(), drive);
        assert_eq!(ctl.cursor().index, 1);
    }

    #[test]
    fn indicator_blinks_at_selected_rate() {
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), every_tick());
        let mut board = MockBoard {
            lines: KeyLines::pressed(&[Note::B], true),
            ..Default::default()
        };
        let signals = TickSignals::new();
        signals.waveform.take();

        let mut toggle_ticks = Vec::new();
        for tick in 0..200u32 {
            if base_tick(&mut ctl, &mut board, &signals).indicator.is_some() {
                toggle_ticks.push(tick);
            }
        }
        assert!(toggle_ticks.len() >= 10);
        for pair in toggle_ticks.windows(2) {
            assert_eq!(pair[1] - pair[0], 17);
        }
        assert_eq!(board.indicator.len(), toggle_ticks.len());
        assert_eq!(board.indicator[0], IndicatorPhase::Off);
    }

    #[test]
    fn zero_divider_is_treated_as_one() {
        let ctl = ControlLoop::new(DiatonicTable::stock(), LoopConfig { key_sample_divider: 0 });
        assert_eq!(ctl.config().key_sample_divider, 1);
    }
}
