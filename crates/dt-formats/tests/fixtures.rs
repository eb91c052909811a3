//! Integration tests for the key script and EEPROM readers against the
//! fixture files.

use dt_engine::{CalibrationStore, KeyLines};
use dt_formats::{load_eeprom, parse_key_script, KeyScript, CALIBRATION_ADDR};
use dt_ir::Note;
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

fn load_script(name: &str) -> KeyScript {
    let path = fixtures_dir().join("keys").join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    parse_key_script(&text).unwrap_or_else(|e| panic!("Failed to parse {}: {}", name, e))
}

fn read_eeprom(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join("eeprom").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

#[test]
fn scale_walks_every_note() {
    let script = load_script("scale.txt");
    let events = script.events();
    assert_eq!(events.len(), 9);

    for (event, note) in events.iter().zip(Note::ALL) {
        assert_eq!(event.lines.reading().note, Some(note));
        assert!(!event.lines.octave_pressed());
    }
    assert_eq!(events[7].lines, KeyLines::pressed(&[Note::C], true));
    assert_eq!(events[8].lines, KeyLines::IDLE);

    // Times strictly increase in this script
    for pair in events.windows(2) {
        assert!(pair[0].at_ms < pair[1].at_ms);
    }
    assert_eq!(script.duration_ms(), 2_000);
}

#[test]
fn chords_resolve_to_lowest_note() {
    let script = load_script("chords.txt");
    let readings: Vec<_> = script.events().iter().map(|e| e.lines.reading()).collect();

    assert_eq!(readings[0].note, Some(Note::D));
    assert_eq!(readings[1].note, Some(Note::E));
    assert!(readings[1].octave);
    assert_eq!(readings[2].note, None);
    assert!(readings[2].octave);
    assert_eq!(readings[3].note, None);

    assert_eq!(script.events()[0].lines.asserted_notes().len(), 3);
}

#[test]
fn calibrated_eeprom() {
    let data = read_eeprom("calibrated.bin");
    let mut image = load_eeprom(&data).unwrap();
    assert_eq!(image.calibration(), data[CALIBRATION_ADDR]);
    assert_eq!(image.read_calibration(), 0x5C);
}

#[test]
fn erased_eeprom() {
    let data = read_eeprom("erased.bin");
    let image = load_eeprom(&data).unwrap();
    assert_eq!(image.calibration(), 0xFF);
}

#[test]
fn truncated_eeprom_fails() {
    let data = read_eeprom("calibrated.bin");
    assert!(load_eeprom(&data[..100]).is_err());
}
