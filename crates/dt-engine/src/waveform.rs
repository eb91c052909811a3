//! Waveform sample scheduling.

use dt_ir::{Note, NoteTable, SAMPLES_PER_CYCLE};

/// Period and compare value handed to the PWM output stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DriveValues {
    /// PWM timer TOP for the next sample.
    pub period: u16,
    /// Compare value (duty cycle) for the next sample.
    pub amplitude: u16,
}

impl DriveValues {
    pub const fn new(period: u16, amplitude: u16) -> Self {
        Self { period, amplitude }
    }

    /// Both fields in one word, period in the high half.
    pub const fn pack(self) -> u32 {
        (self.period as u32) << 16 | self.amplitude as u32
    }

    pub const fn unpack(word: u32) -> Self {
        Self {
            period: (word >> 16) as u16,
            amplitude: word as u16,
        }
    }
}

/// Position in the current note's sample cycle plus the last values emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveformCursor {
    pub index: usize,
    pub output: DriveValues,
}

/// Steps through a note's amplitude samples, one per waveform tick.
#[derive(Clone, Debug, Default)]
pub struct WaveformScheduler {
    cursor: WaveformCursor,
}

impl WaveformScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> &WaveformCursor {
        &self.cursor
    }

    /// Emit the drive values for the current sample and step the cursor.
    ///
    /// Without a selected note the first table entry is used; the output
    /// stage is disabled in that case so nothing is heard. With the octave
    /// flag every other sample is skipped.
    pub fn advance<T: NoteTable>(
        &mut self,
        table: &T,
        note: Option<Note>,
        octave: bool,
    ) -> DriveValues {
        let profile = table.lookup_profile(note.unwrap_or(Note::C));
        let output = DriveValues::new(profile.period, profile.amplitude(self.cursor.index));

        self.cursor.index += if octave { 2 } else { 1 };
        if self.cursor.index >= SAMPLES_PER_CYCLE {
            self.cursor.index = 0;
        }
        self.cursor.output = output;
        output
    }
}
