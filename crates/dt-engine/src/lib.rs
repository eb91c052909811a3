//! Scheduling core of the diatone tone generator.
//!
//! Debounces the key lines, steps the waveform samples of the selected note
//! and times the indicator blink, all driven from two tick signals raised by
//! timer interrupts. No allocation, no blocking.

#![cfg_attr(not(feature = "std"), no_std)]

mod calibration;
mod control;
mod debounce;
mod hal;
mod indicator;
mod keys;
mod signal;
mod waveform;

pub use calibration::{apply_calibration, CALIBRATION_UNSET};
pub use control::{ControlLoop, Dispatch, KeySample, LoopConfig};
pub use debounce::{DebounceState, Debouncer, KeyReading};
pub use hal::{CalibrationStore, Hardware, OscillatorTrim};
pub use indicator::{IndicatorPhase, IndicatorScheduler, IndicatorState};
pub use keys::{KeyLines, RawKeys};
pub use signal::{OutputLatch, TickFlag, TickSignals, POWER_ON_DRIVE};
pub use waveform::{DriveValues, WaveformCursor, WaveformScheduler};
