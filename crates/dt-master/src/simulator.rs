//! Cycle-stepped simulation of the tone generator board.

use dt_audio::Frame;
use dt_engine::{ControlLoop, Dispatch, LoopConfig, RawKeys, TickSignals};
use dt_formats::{EepromImage, KeyScript};
use dt_ir::{DiatonicTable, BASE_TICK_CYCLES, CPU_CLOCK_HZ, KEY_SAMPLE_DIVIDER};

use crate::board::SimBoard;
use crate::timer::CycleTimer;

/// Watchdog timeout of the board, about half a second.
pub const WATCHDOG_TIMEOUT_CYCLES: u64 = CPU_CLOCK_HZ as u64 / 2;

/// Simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub clock_hz: u32,
    /// Host audio frames per second.
    pub sample_rate: u32,
    pub key_sample_divider: u8,
    /// Output level scale, 0.0..=1.0.
    pub gain: f32,
    pub watchdog_timeout_cycles: u64,
}

impl SimConfig {
    fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            key_sample_divider: self.key_sample_divider,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            clock_hz: CPU_CLOCK_HZ,
            sample_rate: 44_100,
            key_sample_divider: KEY_SAMPLE_DIVIDER,
            gain: 0.5,
            watchdog_timeout_cycles: WATCHDOG_TIMEOUT_CYCLES,
        }
    }
}

/// The control loop running on a simulated board.
///
/// Timer 0 raises the base tick every [`BASE_TICK_CYCLES`]; timer 1 raises
/// the waveform tick every `TOP + 1` cycles and latches the prepared drive
/// values into its registers. The loop is polled after every firing and at
/// least once per step, unless the board is stalled.
pub struct Simulator {
    config: SimConfig,
    table: DiatonicTable,
    control: ControlLoop<DiatonicTable>,
    signals: TickSignals,
    board: SimBoard,
    base_timer: CycleTimer,
    pwm_timer: CycleTimer,
    script: KeyScript,
    cycles: u64,
    cycle_remainder: u64,
    resets: u32,
    calibration: Option<u8>,
}

impl Simulator {
    pub fn new(config: SimConfig, script: KeyScript, eeprom: EepromImage) -> Self {
        Self::with_table(config, script, eeprom, DiatonicTable::stock())
    }

    /// A zero clock or sample rate is raised to 1.
    pub fn with_table(
        mut config: SimConfig,
        script: KeyScript,
        eeprom: EepromImage,
        table: DiatonicTable,
    ) -> Self {
        config.clock_hz = config.clock_hz.max(1);
        config.sample_rate = config.sample_rate.max(1);
        let mut board = SimBoard::new(eeprom, config.watchdog_timeout_cycles);
        let calibration = board.power_on();
        let pwm_timer = CycleTimer::new(board.pwm.period_cycles());

        Self {
            control: ControlLoop::new(table.clone(), config.loop_config()),
            config,
            table,
            signals: TickSignals::new(),
            board,
            base_timer: CycleTimer::new(BASE_TICK_CYCLES),
            pwm_timer,
            script,
            cycles: 0,
            cycle_remainder: 0,
            resets: 0,
            calibration,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn board(&self) -> &SimBoard {
        &self.board
    }

    pub fn control(&self) -> &ControlLoop<DiatonicTable> {
        &self.control
    }

    pub fn script(&self) -> &KeyScript {
        &self.script
    }

    /// Debounced selection of the running core.
    pub fn selection(&self) -> RawKeys {
        self.control.selection()
    }

    /// Calibration applied at the last startup.
    pub fn calibration(&self) -> Option<u8> {
        self.calibration
    }

    /// Watchdog resets since the simulation started.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.cycles * 1000 / self.config.clock_hz as u64
    }

    /// Advance by one host frame and sample the speaker.
    pub fn render_frame(&mut self) -> Frame {
        self.cycle_remainder += self.config.clock_hz as u64;
        let cycles = self.cycle_remainder / self.config.sample_rate as u64;
        self.cycle_remainder %= self.config.sample_rate as u64;

        self.step(cycles, true);
        self.board.speaker_frame(self.config.gain)
    }

    /// Advance `cycles` CPU cycles with the loop running.
    pub fn run_cycles(&mut self, cycles: u64) {
        self.step(cycles, true);
    }

    /// Advance `cycles` CPU cycles with the loop hung. Interrupts keep
    /// firing but nothing feeds the watchdog. Returns whether the board
    /// was reset.
    pub fn stall(&mut self, cycles: u64) -> bool {
        let before = self.resets;
        self.step(cycles, false);
        self.resets != before
    }

    fn step(&mut self, cycles: u64, polling: bool) {
        let mut remaining = cycles;
        let mut polled = false;

        while remaining > 0 {
            let next = self.base_timer.until_fire().min(self.pwm_timer.until_fire());
            let chunk = remaining.min(next as u64);
            remaining -= chunk;
            self.cycles += chunk;

            if self.board.watchdog.advance(chunk) {
                self.watchdog_reset();
                continue;
            }

            // chunk never exceeds either timer's remaining count
            let waveform_fired = self.pwm_timer.advance(chunk as u32);
            let base_fired = self.base_timer.advance(chunk as u32);

            if waveform_fired {
                let values = self.signals.on_waveform_tick();
                self.board.pwm.load(values);
                self.pwm_timer.set_period(self.board.pwm.period_cycles());
            }
            if base_fired {
                self.signals.on_base_tick();
            }

            if polling && (waveform_fired || base_fired) {
                self.poll();
                polled = true;
            }
        }

        if polling && !polled {
            self.poll();
        }
    }

    fn poll(&mut self) {
        self.apply_script();
        let dispatch = self.control.poll(&mut self.board, &self.signals);
        self.trace(&dispatch);
    }

    fn apply_script(&mut self) {
        let now = self.elapsed_ms();
        let lines = self.script.lines_at(u32::try_from(now).unwrap_or(u32::MAX));
        if lines != self.board.key_lines {
            log::info!("{} ms: key lines {:08b}", now, lines.levels());
            self.board.key_lines = lines;
        }
    }

    fn trace(&self, dispatch: &Dispatch) {
        if let Some(sample) = dispatch.keys.filter(|s| s.reading.changed) {
            let held = sample.lines.asserted_notes();
            if held.len() > 1 {
                log::debug!("keys {:?} held together, {:?} wins", held, sample.reading.note);
            }
            log::debug!(
                "selection {:?} octave {}",
                sample.reading.note,
                sample.reading.octave
            );
        }
        if let Some(phase) = dispatch.indicator {
            log::debug!("indicator {:?}", phase);
        }
    }

    fn watchdog_reset(&mut self) {
        self.resets += 1;
        log::warn!(
            "watchdog expired at cycle {}, resetting board (reset #{})",
            self.cycles,
            self.resets
        );

        self.calibration = self.board.power_on();
        self.control = ControlLoop::new(self.table.clone(), self.config.loop_config());
        self.signals = TickSignals::new();
        self.base_timer = CycleTimer::new(BASE_TICK_CYCLES);
        self.pwm_timer = CycleTimer::new(self.board.pwm.period_cycles());
    }
}
