//! File formats used by the diatone simulator.
//!
//! Key scripts drive the simulated key lines, EEPROM images hold the
//! oscillator calibration byte, and rendered audio is written as WAV.

mod eeprom;
mod key_script;
mod wav_format;

pub use eeprom::{load_eeprom, EepromImage, CALIBRATION_ADDR, EEPROM_SIZE};
pub use key_script::{parse_key_script, KeyEvent, KeyScript};
pub use wav_format::{frames_to_wav, write_wav, MAX_WAV_FRAMES};

use std::fmt;

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or size
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// Malformed key script line (1-based line number)
    Script { line: usize, message: String },
    /// Too many frames for the 32-bit size fields of a WAV file
    TooLong { frames: u64 },
    /// I/O error
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::Script { line, message } => write!(f, "line {}: {}", line, message),
            FormatError::TooLong { frames } => {
                write!(f, "{} frames exceed the WAV size limit of {}", frames, MAX_WAV_FRAMES)
            }
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
