//! Cycle-counting timer model.

/// A free-running counter that fires every `period` CPU cycles.
///
/// A new period takes effect from the next count after it is set, the way
/// a TOP register update is picked up at the end of the running period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleTimer {
    period: u32,
    count: u32,
}

impl CycleTimer {
    pub const fn new(period: u32) -> Self {
        Self {
            period: if period == 0 { 1 } else { period },
            count: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
        self.count = self.count.min(self.period - 1);
    }

    /// Cycles until the next firing.
    pub fn until_fire(&self) -> u32 {
        self.period - self.count
    }

    /// Count `cycles`, which must not exceed [`until_fire`](Self::until_fire).
    /// Returns whether the timer fired.
    pub fn advance(&mut self, cycles: u32) -> bool {
        self.count += cycles;
        if self.count >= self.period {
            self.count -= self.period;
            true
        } else {
            false
        }
    }
}
