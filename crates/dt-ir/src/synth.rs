//! Offline construction of note tables for a given CPU clock.
//!
//! The board ships with precomputed tables; these functions rebuild them so
//! the stock values can be checked and so the simulator can run at other
//! clock rates.

use core::f32::consts::PI;

use crate::note::{Note, NOTE_COUNT};
use crate::profile::{NoteProfile, SAMPLES_PER_CYCLE};
use crate::table::{DiatonicTable, BLINK_PERIODS};

/// Peak deviation of the sine around mid-scale, as a fraction of the period.
///
/// Kept below one half so the compare value never reaches 0 or TOP.
const SWING: f32 = 0.45;

/// PWM timer TOP that plays `freq_hz` with [`SAMPLES_PER_CYCLE`] samples per
/// cycle. Saturates at `u16::MAX` for very low pitches.
pub fn period_for_frequency(clock_hz: u32, freq_hz: f32) -> u16 {
    if freq_hz <= 0.0 {
        return u16::MAX;
    }
    let top = libm::roundf(clock_hz as f32 / (freq_hz * SAMPLES_PER_CYCLE as f32));
    top.clamp(1.0, u16::MAX as f32) as u16
}

/// One sine cycle of compare values for a PWM timer with the given TOP.
pub fn sine_samples(period: u16) -> [u16; SAMPLES_PER_CYCLE] {
    let mid = period as f32 / 2.0;
    let swing = period as f32 * SWING;
    let mut samples = [0u16; SAMPLES_PER_CYCLE];
    for (i, sample) in samples.iter_mut().enumerate() {
        let phase = 2.0 * PI * i as f32 / SAMPLES_PER_CYCLE as f32;
        *sample = libm::roundf(mid + swing * libm::sinf(phase)) as u16;
    }
    samples
}

/// Profile of a note in the fifth octave for the given clock.
pub fn synthesize_profile(clock_hz: u32, note: Note) -> NoteProfile {
    let period = period_for_frequency(clock_hz, note.frequency_hz());
    NoteProfile::new(period, sine_samples(period))
}

/// Full note table for the given clock, with the stock blink periods.
///
/// Blink periods count base ticks, which are derived from the same clock,
/// so they do not need rescaling.
pub fn synthesize_table(clock_hz: u32) -> DiatonicTable {
    let mut profiles = [NoteProfile::new(0, [0; SAMPLES_PER_CYCLE]); NOTE_COUNT];
    for note in Note::ALL {
        profiles[note.index()] = synthesize_profile(clock_hz, note);
    }
    DiatonicTable::new(profiles, BLINK_PERIODS)
}
