//! Headless controller for the diatone tone generator.
//!
//! Runs the scheduling core on a simulated board and turns the speaker
//! output into audio, either live through the default device or rendered
//! offline to WAV. Shared by the CLI and the end-to-end tests.

mod board;
mod simulator;
mod timer;
mod watchdog;

use dt_audio::{AudioOutput, CpalOutput};
use dt_engine::RawKeys;
use dt_ir::Note;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

// Re-export common types so callers don't need dt-audio/dt-formats directly.
pub use dt_audio::Frame;
pub use dt_formats::{
    frames_to_wav, write_wav, EepromImage, FormatError, KeyScript, MAX_WAV_FRAMES,
};

pub use board::{Oscillator, PwmRegisters, SimBoard};
pub use simulator::{SimConfig, Simulator, WATCHDOG_TIMEOUT_CYCLES};
pub use timer::CycleTimer;
pub use watchdog::Watchdog;

/// Audio rendered after the last script event.
const TAIL_MS: u32 = 1_000;

/// Snapshot of a live playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub elapsed_ms: u64,
    pub selection: RawKeys,
    pub indicator_lit: bool,
    pub resets: u32,
}

/// Headless controller: owns a key script and the board setup, and runs
/// simulations of it.
pub struct Controller {
    config: SimConfig,
    script: KeyScript,
    eeprom: EepromImage,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    progress: Arc<Progress>,
    thread: Option<JoinHandle<()>>,
}

/// Values published by the audio thread.
#[derive(Default)]
struct Progress {
    elapsed_ms: AtomicU64,
    selection: AtomicU8,
    indicator_lit: AtomicBool,
    resets: AtomicU32,
    finished: AtomicBool,
}

const NO_NOTE: u8 = 0x7F;
const OCTAVE_FLAG: u8 = 0x80;

fn encode_selection(keys: RawKeys) -> u8 {
    let note = keys.note.map_or(NO_NOTE, |n| n.index() as u8);
    if keys.octave {
        note | OCTAVE_FLAG
    } else {
        note
    }
}

fn decode_selection(byte: u8) -> RawKeys {
    RawKeys::new(
        Note::from_index((byte & !OCTAVE_FLAG) as usize),
        byte & OCTAVE_FLAG != 0,
    )
}

impl Controller {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            script: KeyScript::default(),
            eeprom: EepromImage::blank(),
            playback: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // --- Setup ---

    pub fn script(&self) -> &KeyScript {
        &self.script
    }

    pub fn load_script(&mut self, text: &str) -> Result<(), FormatError> {
        self.stop();
        self.script = dt_formats::parse_key_script(text)?;
        log::info!(
            "key script: {} events over {} ms",
            self.script.events().len(),
            self.script.duration_ms()
        );
        Ok(())
    }

    pub fn eeprom(&self) -> &EepromImage {
        &self.eeprom
    }

    pub fn load_eeprom(&mut self, data: &[u8]) -> Result<(), FormatError> {
        self.stop();
        self.eeprom = dt_formats::load_eeprom(data)?;
        Ok(())
    }

    /// Script length plus a short tail, rounded up to whole seconds.
    pub fn default_seconds(&self) -> u32 {
        (self.script.duration_ms() + TAIL_MS).div_ceil(1_000)
    }

    pub fn simulator(&self) -> Simulator {
        Simulator::new(self.config, self.script.clone(), self.eeprom.clone())
    }

    // --- Real-time playback ---

    pub fn play(&mut self, seconds: u32) {
        self.stop();

        let stop_signal = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(Progress::default());
        let config = self.config;
        let script = self.script.clone();
        let eeprom = self.eeprom.clone();

        let stop = stop_signal.clone();
        let shared = progress.clone();
        let thread = std::thread::spawn(move || {
            audio_thread(config, script, eeprom, seconds, stop, shared);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            progress,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.progress.finished.load(Ordering::Relaxed))
    }

    pub fn status(&self) -> Option<PlaybackStatus> {
        let pb = self.playback.as_ref()?;
        if pb.progress.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(PlaybackStatus {
            elapsed_ms: pb.progress.elapsed_ms.load(Ordering::Relaxed),
            selection: decode_selection(pb.progress.selection.load(Ordering::Relaxed)),
            indicator_lit: pb.progress.indicator_lit.load(Ordering::Relaxed),
            resets: pb.progress.resets.load(Ordering::Relaxed),
        })
    }

    // --- Offline rendering ---

    pub fn render_frames(&self, max_frames: usize) -> Vec<Frame> {
        let mut sim = self.simulator();
        let mut frames = Vec::with_capacity(max_frames);
        while frames.len() < max_frames {
            frames.push(sim.render_frame());
        }
        frames
    }

    /// Render `seconds` of audio as a WAV file. Lengths the WAV size fields
    /// cannot hold are rejected before rendering.
    pub fn render_to_wav(&self, seconds: u32) -> Result<Vec<u8>, FormatError> {
        let max_frames = self.config.sample_rate as u64 * seconds as u64;
        if max_frames > MAX_WAV_FRAMES {
            return Err(FormatError::TooLong { frames: max_frames });
        }
        let frames = self.render_frames(max_frames as usize);
        frames_to_wav(&frames, self.config.sample_rate)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn audio_thread(
    config: SimConfig,
    script: KeyScript,
    eeprom: EepromImage,
    seconds: u32,
    stop_signal: Arc<AtomicBool>,
    progress: Arc<Progress>,
) {
    let (mut output, consumer) = match CpalOutput::new() {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("no audio output: {}", e);
            progress.finished.store(true, Ordering::Relaxed);
            return;
        }
    };

    // Frames are rendered at the device rate.
    let sample_rate = output.sample_rate();
    let config = SimConfig {
        sample_rate,
        ..config
    };
    let mut sim = Simulator::new(config, script, eeprom);

    if let Err(e) = output.build_stream(consumer) {
        log::error!("{}", e);
        progress.finished.store(true, Ordering::Relaxed);
        return;
    }
    let _ = output.start();

    let total_frames = sample_rate as u64 * seconds as u64;
    let publish_interval = (sample_rate / 100).max(1) as u64;
    let mut frame_count: u64 = 0;

    while frame_count < total_frames && !stop_signal.load(Ordering::Relaxed) {
        output.write_spin(sim.render_frame());
        frame_count += 1;
        if frame_count % publish_interval == 0 {
            progress.elapsed_ms.store(sim.elapsed_ms(), Ordering::Relaxed);
            progress.selection.store(encode_selection(sim.selection()), Ordering::Relaxed);
            progress
                .indicator_lit
                .store(sim.board().indicator.is_lit(), Ordering::Relaxed);
            progress.resets.store(sim.resets(), Ordering::Relaxed);
        }
    }

    for _ in 0..sample_rate / 10 {
        output.write_spin(Frame::silence());
    }
    if output.underruns() > 0 {
        log::warn!("{} frames of audio dropped", output.underruns());
    }
    let _ = output.stop();

    progress.finished.store(true, Ordering::Relaxed);
}
