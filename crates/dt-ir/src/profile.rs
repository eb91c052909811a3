//! Per-note waveform profile.

/// Number of PWM samples in one waveform cycle.
pub const SAMPLES_PER_CYCLE: usize = 20;

/// Waveform definition for one note.
///
/// `period` is the PWM timer TOP for every sample of the note, `samples`
/// the compare values approximating one sine cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteProfile {
    pub period: u16,
    pub samples: [u16; SAMPLES_PER_CYCLE],
}

impl NoteProfile {
    pub const fn new(period: u16, samples: [u16; SAMPLES_PER_CYCLE]) -> Self {
        Self { period, samples }
    }

    /// Amplitude at a cursor position, wrapping past the end of the cycle.
    pub fn amplitude(&self, index: usize) -> u16 {
        self.samples[index % SAMPLES_PER_CYCLE]
    }

    /// Largest compare value of the cycle.
    pub fn peak(&self) -> u16 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    /// Smallest compare value of the cycle.
    pub fn trough(&self) -> u16 {
        self.samples.iter().copied().min().unwrap_or(0)
    }
}
