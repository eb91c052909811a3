//! Clock and tick constants of the tone generator board.

/// CPU clock of the board (internal RC oscillator, no divider).
pub const CPU_CLOCK_HZ: u32 = 8_000_000;

/// Prescaler of the base tick timer.
pub const BASE_TICK_PRESCALER: u32 = 64;

/// Counts per base tick timer overflow (8-bit timer).
pub const BASE_TICK_COUNTS: u32 = 256;

/// CPU cycles between two base ticks (~2 ms at 8 MHz).
pub const BASE_TICK_CYCLES: u32 = BASE_TICK_PRESCALER * BASE_TICK_COUNTS;

/// Base ticks between two key samples.
pub const KEY_SAMPLE_DIVIDER: u8 = 5;

/// Blink threshold used before the first key sample overrides it.
pub const INITIAL_BLINK_TICKS: Ticks = Ticks(100);

/// A count of base ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticks(pub u16);

impl Ticks {
    /// Raw tick count.
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Duration in CPU cycles.
    pub const fn to_cycles(self) -> u64 {
        self.0 as u64 * BASE_TICK_CYCLES as u64
    }
}

/// Base tick rate for a given CPU clock.
pub fn base_tick_hz(clock_hz: u32) -> f32 {
    clock_hz as f32 / BASE_TICK_CYCLES as f32
}

/// Tone frequency produced by a waveform period (timer TOP) when
/// `samples` samples make up one cycle.
///
/// The PWM timer counts `0..=top`, so one sample lasts `top + 1` cycles.
pub fn tone_hz(clock_hz: u32, top: u16, samples: usize) -> f32 {
    if samples == 0 {
        return 0.0;
    }
    clock_hz as f32 / ((top as u32 + 1) as f32 * samples as f32)
}
