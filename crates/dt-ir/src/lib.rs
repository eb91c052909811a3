//! Static data for the diatone tone generator.
//!
//! Defines the note catalogue, the per-note waveform profiles and blink
//! periods, and the clock constants the scheduling core is built around.
//! Everything here is read-only at runtime.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod note;
mod profile;
mod synth;
mod table;
mod timing;

pub use note::{Note, NOTE_COUNT};
pub use profile::{NoteProfile, SAMPLES_PER_CYCLE};
pub use synth::{period_for_frequency, sine_samples, synthesize_profile, synthesize_table};
pub use table::{
    blink_index, DiatonicTable, NoteTable, StockTable, BLINK_ENTRIES, BLINK_PERIODS,
    DIATONIC_PROFILES,
};
pub use timing::{
    base_tick_hz, tone_hz, Ticks, BASE_TICK_COUNTS, BASE_TICK_CYCLES, BASE_TICK_PRESCALER,
    CPU_CLOCK_HZ, INITIAL_BLINK_TICKS, KEY_SAMPLE_DIVIDER,
};
