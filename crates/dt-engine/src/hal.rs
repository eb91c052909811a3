//! Board collaborators the control loop drives.

use crate::indicator::IndicatorPhase;
use crate::keys::KeyLines;

/// Pins and peripherals touched by the control loop.
///
/// PWM period and compare registers are not here: only the waveform
/// interrupt writes them, from [`crate::TickSignals::on_waveform_tick`].
pub trait Hardware {
    /// Current levels of the key input lines.
    fn read_key_lines(&mut self) -> KeyLines;

    /// Connect or float both speaker channels.
    fn set_output_enabled(&mut self, enabled: bool);

    /// Drive the indicator line pair.
    fn set_indicator(&mut self, phase: IndicatorPhase);

    /// Acknowledge the watchdog.
    fn feed_watchdog(&mut self);
}

/// Persistent storage holding the oscillator calibration byte.
pub trait CalibrationStore {
    fn read_calibration(&mut self) -> u8;
}

/// The CPU oscillator's trim register.
pub trait OscillatorTrim {
    fn set_trim(&mut self, value: u8);
}

impl<H: Hardware + ?Sized> Hardware for &mut H {
    fn read_key_lines(&mut self) -> KeyLines {
        (**self).read_key_lines()
    }

    fn set_output_enabled(&mut self, enabled: bool) {
        (**self).set_output_enabled(enabled)
    }

    fn set_indicator(&mut self, phase: IndicatorPhase) {
        (**self).set_indicator(phase)
    }

    fn feed_watchdog(&mut self) {
        (**self).feed_watchdog()
    }
}
