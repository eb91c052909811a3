//! diatone CLI: simulate the tone generator from a key script, playing the
//! result live or rendering it to WAV.
//!
//! Usage:
//!   diatone keys.txt
//!   diatone keys.txt --wav out.wav --seconds 5
//!   diatone keys.txt --eeprom eeprom.bin --key-divider 1

use anyhow::{bail, Context, Result};
use clap::Parser;
use dt_ir::{tone_hz, DiatonicTable, Note, NoteTable, SAMPLES_PER_CYCLE};
use dt_master::{Controller, SimConfig};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "diatone")]
#[command(version, about = "Diatonic tone generator simulator", long_about = None)]
struct Cli {
    /// Key script: one `<time_ms> <keys>` event per line
    script: PathBuf,

    /// Render to this WAV file instead of playing
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Length in seconds (defaults to the script length plus one second)
    #[arg(long)]
    seconds: Option<u32>,

    /// 128-byte EEPROM image holding the oscillator calibration
    #[arg(long)]
    eeprom: Option<PathBuf>,

    /// Sample rate used for WAV rendering
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// Base ticks between key samples
    #[arg(long, default_value_t = dt_ir::KEY_SAMPLE_DIVIDER)]
    key_divider: u8,

    /// Output gain, 0.0 to 1.0
    #[arg(long, default_value_t = 0.5)]
    gain: f32,
}

/// INFO by default; `RUST_LOG` overrides.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "\r[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.gain) {
        bail!("gain must be between 0.0 and 1.0, got {}", cli.gain);
    }
    if cli.sample_rate == 0 {
        bail!("sample rate must be positive");
    }

    let config = SimConfig {
        sample_rate: cli.sample_rate,
        key_sample_divider: cli.key_divider,
        gain: cli.gain,
        ..SimConfig::default()
    };
    log::info!(
        "board clock {} Hz, key sample every {} base ticks",
        config.clock_hz,
        config.key_sample_divider
    );
    let mut ctrl = Controller::new(config);

    let text = fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read {}", cli.script.display()))?;
    ctrl.load_script(&text)
        .with_context(|| format!("failed to parse {}", cli.script.display()))?;

    if let Some(path) = &cli.eeprom {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        ctrl.load_eeprom(&data)
            .with_context(|| format!("bad EEPROM image {}", path.display()))?;
    }

    print_note_table(&DiatonicTable::stock(), config.clock_hz);

    let seconds = cli.seconds.unwrap_or_else(|| ctrl.default_seconds());
    match &cli.wav {
        Some(path) => render_to_wav(&ctrl, path, seconds),
        None => {
            play_audio(&mut ctrl, seconds);
            Ok(())
        }
    }
}

fn print_note_table(table: &DiatonicTable, clock_hz: u32) {
    println!("Note  TOP   Hz       Hz (8va)  Blink  Blink (8va)  Min  Max");
    for (note, profile) in Note::ALL.into_iter().zip(table.profiles()) {
        println!(
            "{:<4}  {:<4}  {:<7.2}  {:<8.2}  {:<5}  {:<11}  {:<3}  {}",
            note.letter(),
            profile.period,
            tone_hz(clock_hz, profile.period, SAMPLES_PER_CYCLE),
            tone_hz(clock_hz, profile.period, SAMPLES_PER_CYCLE / 2),
            table.lookup_blink_period(Some(note), false).get(),
            table.lookup_blink_period(Some(note), true).get(),
            profile.trough(),
            profile.peak(),
        );
    }
    println!();
}

fn play_audio(ctrl: &mut Controller, seconds: u32) {
    ctrl.play(seconds);
    println!("Playing {} s...", seconds);

    while ctrl.is_playing() {
        if let Some(status) = ctrl.status() {
            let note = status
                .selection
                .note
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            print!(
                "\r{:>6} ms | Note: {:<2}{} | LED: {} | Resets: {}",
                status.elapsed_ms,
                note,
                if status.selection.octave { "+" } else { " " },
                if status.indicator_lit { "*" } else { "." },
                status.resets
            );
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.                                   ");
}

fn render_to_wav(ctrl: &Controller, path: &Path, seconds: u32) -> Result<()> {
    let sample_rate = ctrl.config().sample_rate;
    println!("Rendering {} s to {} at {} Hz...", seconds, path.display(), sample_rate);

    let wav = ctrl
        .render_to_wav(seconds)
        .with_context(|| format!("cannot render {} s at {} Hz", seconds, sample_rate))?;
    fs::write(path, &wav).with_context(|| format!("failed to write {}", path.display()))?;

    let frames = (wav.len() - 44) / 2;
    println!(
        "Wrote {} frames ({:.1}s) to {}",
        frames,
        frames as f64 / sample_rate as f64,
        path.display()
    );
    Ok(())
}
