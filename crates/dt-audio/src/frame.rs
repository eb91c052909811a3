//! Audio frame type.

/// One mono sample of the speaker signal (16-bit).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub level: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { level: 0 }
    }

    pub const fn new(level: i16) -> Self {
        Self { level }
    }

    /// Speaker level produced by two complementary PWM channels.
    ///
    /// Over one PWM period of `top + 1` counts, the non-inverted channel is
    /// high for `duty` counts and the inverted one for the rest, so the
    /// average differential voltage is `(2 * duty - (top + 1)) / (top + 1)`
    /// of full scale. `gain` is 0.0..=1.0.
    pub fn from_pwm(top: u16, duty: u16, gain: f32) -> Self {
        let span = top as i64 + 1;
        let duty = (duty as i64).min(span);
        let ratio = (2 * duty - span) as f32 / span as f32;
        let level = (ratio * gain.clamp(0.0, 1.0) * i16::MAX as f32) as i32;
        Self {
            level: level.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        }
    }

    /// Level as a float in -1.0..=1.0.
    pub fn to_f32(self) -> f32 {
        self.level as f32 / 32768.0
    }

    pub fn is_silent(self) -> bool {
        self.level == 0
    }
}
