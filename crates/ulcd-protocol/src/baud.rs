//! Baud Rate Table
//!
//! The display selects its line speed with a small numeric code. Only the
//! codes with a standard host line speed are listed; the module supports
//! further rates that host serial drivers do not offer.

use crate::error::UlcdError;
use serde::{Deserialize, Serialize};

/// Line speeds reachable through the serial transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaudRate {
    B110,
    B300,
    B600,
    B1200,
    B2400,
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B500000,
}

impl BaudRate {
    /// Line speed in bits per second
    pub fn bits_per_second(&self) -> u32 {
        match self {
            BaudRate::B110 => 110,
            BaudRate::B300 => 300,
            BaudRate::B600 => 600,
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
            BaudRate::B500000 => 500000,
        }
    }

    /// Device baud-select code for this speed
    pub fn code(&self) -> u8 {
        match self {
            BaudRate::B110 => 0,
            BaudRate::B300 => 1,
            BaudRate::B600 => 2,
            BaudRate::B1200 => 3,
            BaudRate::B2400 => 4,
            BaudRate::B4800 => 5,
            BaudRate::B9600 => 6,
            BaudRate::B19200 => 8,
            BaudRate::B38400 => 10,
            BaudRate::B57600 => 12,
            BaudRate::B115200 => 13,
            BaudRate::B500000 => 18,
        }
    }

    /// Look up the speed for a device baud-select code
    pub fn from_code(code: u8) -> Result<Self, UlcdError> {
        BAUD_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, rate)| *rate)
            .ok_or(UlcdError::UnknownBaudCode(code))
    }
}

/// Device baud-select code to line speed
pub const BAUD_TABLE: [(u8, BaudRate); 12] = [
    (0, BaudRate::B110),
    (1, BaudRate::B300),
    (2, BaudRate::B600),
    (3, BaudRate::B1200),
    (4, BaudRate::B2400),
    (5, BaudRate::B4800),
    (6, BaudRate::B9600),
    (8, BaudRate::B19200),
    (10, BaudRate::B38400),
    (12, BaudRate::B57600),
    (13, BaudRate::B115200),
    (18, BaudRate::B500000),
];
