//! Startup oscillator calibration.

use crate::hal::{CalibrationStore, OscillatorTrim};

/// Value of an erased calibration cell.
pub const CALIBRATION_UNSET: u8 = 0xFF;

/// Read the stored calibration once and apply it to the oscillator trim.
///
/// An erased cell leaves the factory trim in place and returns `None`.
pub fn apply_calibration<S, T>(store: &mut S, trim: &mut T) -> Option<u8>
where
    S: CalibrationStore + ?Sized,
    T: OscillatorTrim + ?Sized,
{
    let value = store.read_calibration();
    if value == CALIBRATION_UNSET {
        return None;
    }
    trim.set_trim(value);
    Some(value)
}
