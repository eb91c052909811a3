//! Watchdog model.

/// Counts CPU cycles since the last feed and expires after `timeout`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watchdog {
    timeout: u64,
    elapsed: u64,
}

impl Watchdog {
    pub const fn new(timeout: u64) -> Self {
        Self {
            timeout,
            elapsed: 0,
        }
    }

    /// Cycles since the last feed.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn feed(&mut self) {
        self.elapsed = 0;
    }

    /// Count `cycles`. Returns `true` once the timeout has passed without a
    /// feed; the counter restarts from zero.
    pub fn advance(&mut self, cycles: u64) -> bool {
        self.elapsed += cycles;
        if self.elapsed >= self.timeout {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeding_keeps_it_quiet() {
        let mut wd = Watchdog::new(100);
        for _ in 0..50 {
            assert!(!wd.advance(60));
            wd.feed();
        }
    }

    #[test]
    fn expires_without_feed() {
        let mut wd = Watchdog::new(100);
        assert!(!wd.advance(60));
        assert!(wd.advance(40));
        assert_eq!(wd.elapsed(), 0);
    }
}
