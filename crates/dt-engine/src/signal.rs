//! State shared between the tick interrupts and the control loop.
//!
//! Tick sources only raise flags and read the output latch; the control
//! loop only clears flags and writes the latch. Every shared field is a
//! single atomic word, so no locking is needed.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use dt_ir::DIATONIC_PROFILES;

use crate::waveform::DriveValues;

/// Output values in effect before the loop has computed any sample: the
/// first note's period with the compare registers at their reset value.
pub const POWER_ON_DRIVE: DriveValues = DriveValues::new(DIATONIC_PROFILES[0].period, u16::MAX);

/// Single-slot, overwrite-on-fire event flag.
///
/// Several firings before the loop looks collapse into one event.
#[derive(Debug)]
pub struct TickFlag {
    pending: AtomicBool,
}

impl TickFlag {
    pub const fn new(pending: bool) -> Self {
        Self {
            pending: AtomicBool::new(pending),
        }
    }

    /// Interrupt side: mark the tick as pending.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Loop side: clear the flag, returning whether it was set.
    ///
    /// Load then store instead of a swap: only the loop ever clears, and a
    /// raise landing between the two is the same event the load saw.
    pub fn take(&self) -> bool {
        if self.pending.load(Ordering::Acquire) {
            self.pending.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

/// Two-phase hand-off of drive values to the output stage.
///
/// The loop prepares the next sample's values during the current period;
/// the waveform interrupt applies them when the next period starts. Period
/// and amplitude travel in one word, so the interrupt can never see a pair
/// mixed from two computations.
#[derive(Debug)]
pub struct OutputLatch {
    prepared: AtomicU32,
}

impl OutputLatch {
    pub const fn new(initial: DriveValues) -> Self {
        Self {
            prepared: AtomicU32::new(initial.pack()),
        }
    }

    /// Loop side: stage the values for the next waveform period.
    pub fn prepare(&self, values: DriveValues) {
        self.prepared.store(values.pack(), Ordering::Release);
    }

    /// Interrupt side: the values to write into the output registers.
    pub fn take_prepared(&self) -> DriveValues {
        DriveValues::unpack(self.prepared.load(Ordering::Acquire))
    }
}

/// The two tick channels and the output latch.
///
/// `const`-constructible so firmware can keep it in a `static` reachable from
/// the interrupt handlers. Both flags start raised so the first loop
/// iteration computes a sample and reads the keys straight away.
#[derive(Debug)]
pub struct TickSignals {
    pub base: TickFlag,
    pub waveform: TickFlag,
    pub latch: OutputLatch,
}

impl TickSignals {
    pub const fn new() -> Self {
        Self {
            base: TickFlag::new(true),
            waveform: TickFlag::new(true),
            latch: OutputLatch::new(POWER_ON_DRIVE),
        }
    }

    /// Base timer overflow handler body.
    pub fn on_base_tick(&self) {
        self.base.raise();
    }

    /// Waveform timer overflow handler body. Returns the values the handler
    /// must write into the period and compare registers.
    pub fn on_waveform_tick(&self) -> DriveValues {
        let values = self.latch.take_prepared();
        self.waveform.raise();
        values
    }
}

impl Default for TickSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_pending() {
        let signals = TickSignals::new();
        assert!(signals.base.take());
        assert!(signals.waveform.take());
        assert!(!signals.base.take());
        assert!(!signals.waveform.take());
    }

    #[test]
    fn repeated_firings_collapse() {
        let signals = TickSignals::new();
        signals.base.take();
        signals.on_base_tick();
        signals.on_base_tick();
        signals.on_base_tick();
        assert!(signals.base.take());
        assert!(!signals.base.take());
    }

    #[test]
    fn interrupt_applies_previously_prepared_values() {
        let signals = TickSignals::new();
        assert_eq!(signals.on_waveform_tick(), POWER_ON_DRIVE);

        signals.latch.prepare(DriveValues::new(681, 341));
        // Prepared during period k, visible at the start of period k+1.
        assert_eq!(signals.on_waveform_tick(), DriveValues::new(681, 341));
        assert_eq!(signals.on_waveform_tick(), DriveValues::new(681, 341));
    }

    #[test]
    fn latch_never_mixes_two_computations() {
        let latch = OutputLatch::new(POWER_ON_DRIVE);
        let pairs = [
            DriveValues::new(764, 38),
            DriveValues::new(405, 385),
            DriveValues::new(u16::MAX, 0),
            DriveValues::new(0, u16::MAX),
        ];
        for (i, pair) in pairs.iter().enumerate() {
            latch.prepare(*pair);
            if i % 2 == 1 {
                // Overwritten before the interrupt: only the newest pair survives.
                assert_eq!(latch.take_prepared(), *pair);
            }
        }
        assert_eq!(latch.take_prepared(), pairs[3]);
    }

    #[test]
    fn concurrent_reader_sees_whole_pairs() {
        use std::sync::Arc;
        use std::thread;

        let latch = Arc::new(OutputLatch::new(DriveValues::new(0, u16::MAX)));
        let writer = {
            let latch = latch.clone();
            thread::spawn(move || {
                for p in 0..100_000u32 {
                    let p = p as u16;
                    latch.prepare(DriveValues::new(p, !p));
                }
            })
        };
        for _ in 0..100_000 {
            let v = latch.take_prepared();
            assert_eq!(v.amplitude, !v.period);
        }
        writer.join().unwrap();
    }

    #[test]
    fn power_on_drive_uses_first_note() {
        assert_eq!(POWER_ON_DRIVE.period, 764);
        assert_eq!(POWER_ON_DRIVE.amplitude, u16::MAX);
    }
}
