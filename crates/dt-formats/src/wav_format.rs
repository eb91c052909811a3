//! WAV encoding for 16-bit mono PCM.

use crate::FormatError;
use dt_audio::Frame;
use std::io::{self, Write};

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);

/// Longest clip whose sizes fit the 32-bit RIFF size fields.
pub const MAX_WAV_FRAMES: u64 = (u32::MAX as u64 - 36) / BLOCK_ALIGN as u64;

pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> io::Result<()> {
    let wav = frames_to_wav(frames, sample_rate)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    w.write_all(&wav)
}

pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Result<Vec<u8>, FormatError> {
    let count = frames.len() as u64;
    if count > MAX_WAV_FRAMES {
        return Err(FormatError::TooLong { frames: count });
    }
    // fits: count * BLOCK_ALIGN + 36 <= u32::MAX
    let data_size = (count * BLOCK_ALIGN as u64) as u32;
    let mut buf = Vec::with_capacity(44 + data_size as usize);

    push_riff_header(&mut buf, data_size);
    push_fmt_chunk(&mut buf, sample_rate);
    push_data_chunk(&mut buf, frames, data_size);
    Ok(buf)
}

fn push_riff_header(buf: &mut Vec<u8>, data_size: u32) {
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
}

fn push_fmt_chunk(buf: &mut Vec<u8>, sample_rate: u32) {
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&sample_rate.saturating_mul(BLOCK_ALIGN as u32).to_le_bytes());
    buf.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
}

fn push_data_chunk(buf: &mut Vec<u8>, frames: &[Frame], data_size: u32) {
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for frame in frames {
        buf.extend_from_slice(&frame.level.to_le_bytes());
    }
}
