//! EEPROM image reader.

use binrw::io::Cursor;
use binrw::BinRead;
use dt_engine::{CalibrationStore, CALIBRATION_UNSET};

use crate::FormatError;

/// Size of the data EEPROM.
pub const EEPROM_SIZE: usize = 128;

/// Address of the oscillator calibration byte.
pub const CALIBRATION_ADDR: usize = 0x7F;

/// Full dump of the data EEPROM.
#[derive(BinRead, Clone, Debug, PartialEq, Eq)]
#[br(little)]
pub struct EepromImage {
    bytes: [u8; EEPROM_SIZE],
}

impl EepromImage {
    /// An erased part: every cell reads `0xFF`.
    pub fn blank() -> Self {
        Self {
            bytes: [CALIBRATION_UNSET; EEPROM_SIZE],
        }
    }

    /// A blank image with a calibration byte written.
    pub fn with_calibration(value: u8) -> Self {
        let mut image = Self::blank();
        image.bytes[CALIBRATION_ADDR] = value;
        image
    }

    pub fn calibration(&self) -> u8 {
        self.bytes[CALIBRATION_ADDR]
    }

    pub fn as_bytes(&self) -> &[u8; EEPROM_SIZE] {
        &self.bytes
    }
}

impl Default for EepromImage {
    fn default() -> Self {
        Self::blank()
    }
}

impl CalibrationStore for EepromImage {
    fn read_calibration(&mut self) -> u8 {
        self.calibration()
    }
}

/// Load an EEPROM dump. The dump must cover the whole EEPROM.
pub fn load_eeprom(data: &[u8]) -> Result<EepromImage, FormatError> {
    if data.len() < EEPROM_SIZE {
        return Err(FormatError::UnexpectedEof);
    }
    if data.len() > EEPROM_SIZE {
        return Err(FormatError::InvalidHeader);
    }
    EepromImage::read(&mut Cursor::new(data)).map_err(|e| match e {
        binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            FormatError::UnexpectedEof
        }
        other => FormatError::Io(other.to_string()),
    })
}
