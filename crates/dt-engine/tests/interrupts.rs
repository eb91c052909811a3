//! Runs the control loop against tick sources firing from another thread,
//! the way timer interrupts preempt the loop on the board.

use dt_engine::{
    ControlLoop, DriveValues, Hardware, IndicatorPhase, KeyLines, LoopConfig, TickSignals,
    POWER_ON_DRIVE,
};
use dt_ir::{DiatonicTable, Note, NoteTable, DIATONIC_PROFILES};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

static SIGNALS: TickSignals = TickSignals::new();

struct Board {
    lines: KeyLines,
    feeds: u64,
}

impl Hardware for Board {
    fn read_key_lines(&mut self) -> KeyLines {
        self.lines
    }

    fn set_output_enabled(&mut self, _enabled: bool) {}

    fn set_indicator(&mut self, _phase: IndicatorPhase) {}

    fn feed_watchdog(&mut self) {
        self.feeds += 1;
    }
}

fn is_table_pair(values: DriveValues) -> bool {
    values == POWER_ON_DRIVE
        || DIATONIC_PROFILES
            .iter()
            .any(|p| p.period == values.period && p.samples.contains(&values.amplitude))
}

#[test]
fn interrupt_side_only_sees_whole_pairs() {
    let stop = Arc::new(AtomicBool::new(false));

    let isr = {
        let stop = stop.clone();
        thread::spawn(move || {
            let mut latched = Vec::new();
            let mut n: u32 = 0;
            while !stop.load(Ordering::Relaxed) {
                latched.push(SIGNALS.on_waveform_tick());
                n += 1;
                if n % 7 == 0 {
                    SIGNALS.on_base_tick();
                }
                thread::yield_now();
            }
            latched
        })
    };

    let mut ctl = ControlLoop::new(DiatonicTable::stock(), LoopConfig { key_sample_divider: 1 });
    let mut board = Board {
        lines: KeyLines::pressed(&[Note::E], false),
        feeds: 0,
    };

    for i in 0..200_000u32 {
        // Alternate notes so consecutive prepared pairs differ in both fields.
        if i % 5_000 == 0 {
            let note = Note::ALL[(i / 5_000) as usize % Note::ALL.len()];
            board.lines = KeyLines::pressed(&[note], i % 10_000 == 0);
        }
        ctl.poll(&mut board, &SIGNALS);
    }
    stop.store(true, Ordering::Relaxed);

    let latched = isr.join().unwrap();
    assert!(!latched.is_empty());
    for values in latched {
        assert!(is_table_pair(values), "torn pair {:?}", values);
    }
    assert_eq!(board.feeds, 200_000);
}

#[test]
fn table_lookup_is_consistent_with_latch_packing() {
    let table = DiatonicTable::stock();
    for note in Note::ALL {
        let profile = table.lookup_profile(note);
        for &amplitude in &profile.samples {
            let values = DriveValues::new(profile.period, amplitude);
            assert_eq!(DriveValues::unpack(values.pack()), values);
        }
    }
}
