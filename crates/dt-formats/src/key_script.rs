//! Key script parser.
//!
//! A key script is a text file with one event per line:
//!
//! ```text
//! # time_ms  keys
//! 0          C
//! 500        E+
//! 1000       -
//! 1200       +
//! ```
//!
//! `keys` is `-` for nothing pressed, or note letters `CDEFGAB` followed by
//! an optional `+` for the octave line. `+` alone presses only the octave
//! line. Times must not decrease.

use dt_engine::KeyLines;
use dt_ir::Note;

use crate::FormatError;

/// Key line levels applied from `at_ms` until the next event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub at_ms: u32,
    pub lines: KeyLines,
}

/// A parsed key script, ordered by time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyScript {
    events: Vec<KeyEvent>,
}

impl KeyScript {
    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event.
    pub fn duration_ms(&self) -> u32 {
        self.events.last().map_or(0, |e| e.at_ms)
    }

    /// Key lines in effect at `ms`. Before the first event nothing is held.
    pub fn lines_at(&self, ms: u32) -> KeyLines {
        let n = self.events.partition_point(|e| e.at_ms <= ms);
        match n {
            0 => KeyLines::IDLE,
            _ => self.events[n - 1].lines,
        }
    }
}

/// Parse a key script.
pub fn parse_key_script(text: &str) -> Result<KeyScript, FormatError> {
    let mut events: Vec<KeyEvent> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let mut fields = content.split_whitespace();
        let (Some(time), Some(keys)) = (fields.next(), fields.next()) else {
            return Err(script_error(line, "expected `<time_ms> <keys>`"));
        };
        if fields.next().is_some() {
            return Err(script_error(line, "trailing text after keys"));
        }

        let at_ms: u32 = time
            .parse()
            .map_err(|_| script_error(line, format!("bad time `{}`", time)))?;
        if let Some(prev) = events.last() {
            if at_ms < prev.at_ms {
                return Err(script_error(
                    line,
                    format!("time {} is before previous event at {}", at_ms, prev.at_ms),
                ));
            }
        }

        let lines = parse_keys(keys).map_err(|message| script_error(line, message))?;
        events.push(KeyEvent { at_ms, lines });
    }

    Ok(KeyScript { events })
}

fn parse_keys(keys: &str) -> Result<KeyLines, String> {
    if keys == "-" {
        return Ok(KeyLines::IDLE);
    }

    let (letters, octave) = match keys.strip_suffix('+') {
        Some(rest) => (rest, true),
        None => (keys, false),
    };

    let mut lines = KeyLines::IDLE;
    for c in letters.chars() {
        let note = Note::from_letter(c).ok_or_else(|| format!("unknown key `{}`", c))?;
        lines = lines.press(note);
    }
    if octave {
        lines = lines.press_octave();
    }
    Ok(lines)
}

fn script_error(line: usize, message: impl Into<String>) -> FormatError {
    FormatError::Script {
        line,
        message: message.into(),
    }
}
