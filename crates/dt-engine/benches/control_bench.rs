use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dt_engine::{ControlLoop, Hardware, IndicatorPhase, KeyLines, LoopConfig, TickSignals};
use dt_ir::{DiatonicTable, Note, StockTable};

struct NullBoard {
    lines: KeyLines,
}

impl Hardware for NullBoard {
    fn read_key_lines(&mut self) -> KeyLines {
        self.lines
    }

    fn set_output_enabled(&mut self, enabled: bool) {
        black_box(enabled);
    }

    fn set_indicator(&mut self, phase: IndicatorPhase) {
        black_box(phase);
    }

    fn feed_watchdog(&mut self) {}
}

fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll");

    group.bench_function("idle", |b| {
        let mut ctl = ControlLoop::new(StockTable, LoopConfig::default());
        let mut board = NullBoard { lines: KeyLines::IDLE };
        let signals = TickSignals::new();
        b.iter(|| black_box(ctl.poll(&mut board, &signals)));
    });

    group.bench_function("both_ticks", |b| {
        let config = LoopConfig {
            key_sample_divider: 1,
        };
        let mut ctl = ControlLoop::new(DiatonicTable::stock(), config);
        let mut board = NullBoard {
            lines: KeyLines::pressed(&[Note::A], true),
        };
        let signals = TickSignals::new();
        b.iter(|| {
            signals.on_base_tick();
            black_box(signals.on_waveform_tick());
            black_box(ctl.poll(&mut board, &signals))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_poll);
criterion_main!(benches);
