//! Simulated board peripherals.

use dt_audio::Frame;
use dt_engine::{
    apply_calibration, DriveValues, Hardware, IndicatorPhase, KeyLines, OscillatorTrim,
    POWER_ON_DRIVE,
};
use dt_formats::EepromImage;

use crate::watchdog::Watchdog;

/// Timer 1 registers driving the two complementary PWM outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmRegisters {
    pub top: u16,
    /// Compare value shared by both channels; channel B is inverted.
    pub compare: u16,
}

impl PwmRegisters {
    pub const fn power_on() -> Self {
        Self {
            top: POWER_ON_DRIVE.period,
            compare: POWER_ON_DRIVE.amplitude,
        }
    }

    pub fn load(&mut self, values: DriveValues) {
        self.top = values.period;
        self.compare = values.amplitude;
    }

    /// CPU cycles in one PWM period.
    pub fn period_cycles(&self) -> u32 {
        self.top as u32 + 1
    }
}

/// Factory-trimmed oscillator with an optional user calibration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Oscillator {
    pub trim: Option<u8>,
}

impl OscillatorTrim for Oscillator {
    fn set_trim(&mut self, value: u8) {
        self.trim = Some(value);
    }
}

/// Pins and peripherals the control loop talks to.
#[derive(Clone, Debug)]
pub struct SimBoard {
    pub key_lines: KeyLines,
    pub output_enabled: bool,
    pub pwm: PwmRegisters,
    pub indicator: IndicatorPhase,
    pub indicator_toggles: u64,
    pub oscillator: Oscillator,
    pub watchdog: Watchdog,
    eeprom: EepromImage,
}

impl SimBoard {
    pub fn new(eeprom: EepromImage, watchdog_timeout: u64) -> Self {
        Self {
            key_lines: KeyLines::IDLE,
            output_enabled: false,
            pwm: PwmRegisters::power_on(),
            indicator: IndicatorPhase::OnPair,
            indicator_toggles: 0,
            oscillator: Oscillator::default(),
            watchdog: Watchdog::new(watchdog_timeout),
            eeprom,
        }
    }

    /// Put every peripheral back to its reset state and run the startup
    /// calibration. Key pins are external and keep their levels.
    pub fn power_on(&mut self) -> Option<u8> {
        self.output_enabled = false;
        self.pwm = PwmRegisters::power_on();
        self.indicator = IndicatorPhase::OnPair;
        self.oscillator = Oscillator::default();
        self.watchdog.feed();

        let applied = apply_calibration(&mut self.eeprom, &mut self.oscillator);
        match applied {
            Some(value) => log::info!("oscillator calibration 0x{:02X} applied", value),
            None => log::info!("no oscillator calibration stored, keeping factory trim"),
        }
        applied
    }

    /// Speaker level: the differential average of the two PWM channels.
    pub fn speaker_frame(&self, gain: f32) -> Frame {
        if !self.output_enabled {
            return Frame::silence();
        }
        Frame::from_pwm(self.pwm.top, self.pwm.compare, gain)
    }
}

impl Hardware for SimBoard {
    fn read_key_lines(&mut self) -> KeyLines {
        self.key_lines
    }

    fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    fn set_indicator(&mut self, phase: IndicatorPhase) {
        self.indicator = phase;
        self.indicator_toggles += 1;
    }

    fn feed_watchdog(&mut self) {
        self.watchdog.feed();
    }
}
