//! Command byte encoding.
//!
//! Every bus transaction starts with one command byte:
//!
//! ```text
//! | B7    | B6   | B5   | B4   | B3   | B2    | B1    | B0    |
//! | START | MODE | RS4  | RS3  | RS2  | RS1   | RS0   | R/~W  |   MODE = 1
//! | START | MODE | CAL1 | CAL0 | IMPD | RATE2 | RATE1 | RATE0 |   MODE = 0
//! ```

use crate::params::CalibrationKind;

const START: u8 = 0x80;
const MODE1: u8 = 0x40;
const READ: u8 = 0x01;
const IMPD: u8 = 0x08;
const REGISTER_MASK: u8 = 0x1F;
const RATE_MASK: u8 = 0x07;
const CAL_SHIFT: u8 = 4;

/// Direction of a register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Register read.
    Read,
    /// Register write.
    Write,
}

/// A single encoded command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command(u8);

/// Decoded meaning of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// MODE1 register access.
    Register {
        /// Target register address.
        address: u8,
        /// Read or write.
        access: Access,
    },
    /// MODE0 conversion start with the given `RATE[2:0]` code.
    Convert {
        /// Rate code.
        rate: u8,
    },
    /// MODE0 calibration start.
    Calibrate(CalibrationKind),
    /// MODE0 power-down.
    PowerDown,
}

impl Command {
    /// Builds a MODE1 register access command.
    pub const fn register(address: u8, access: Access) -> Self {
        let mut byte = START | MODE1 | ((address & REGISTER_MASK) << 1);
        if matches!(access, Access::Read) {
            byte |= READ;
        }
        Self(byte)
    }

    /// Builds a MODE1 register read command.
    pub const fn read(address: u8) -> Self {
        Self::register(address, Access::Read)
    }

    /// Builds a MODE1 register write command.
    pub const fn write(address: u8) -> Self {
        Self::register(address, Access::Write)
    }

    /// Builds a MODE0 conversion start command for a `RATE[2:0]` code.
    ///
    /// The code is not checked against the active conversion mode; callers go
    /// through [`SingleCycleRate`](crate::params::SingleCycleRate) or
    /// [`ContinuousRate`](crate::params::ContinuousRate) for that.
    pub const fn convert(rate: u8) -> Self {
        Self(START | (rate & RATE_MASK))
    }

    /// Builds a MODE0 calibration start command.
    pub const fn calibrate(kind: CalibrationKind) -> Self {
        Self(START | ((kind as u8) << CAL_SHIFT))
    }

    /// Builds the MODE0 power-down command.
    pub const fn power_down() -> Self {
        Self(START | IMPD)
    }

    /// Wraps a raw byte, returning `None` when the start marker is missing.
    pub const fn from_bits(byte: u8) -> Option<Self> {
        if byte & START == 0 {
            None
        } else {
            Some(Self(byte))
        }
    }

    /// Returns the encoded byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Decodes the command.
    pub const fn kind(self) -> CommandKind {
        let byte = self.0;
        if byte & MODE1 != 0 {
            let access = if byte & READ != 0 {
                Access::Read
            } else {
                Access::Write
            };
            return CommandKind::Register {
                address: (byte >> 1) & REGISTER_MASK,
                access,
            };
        }

        if byte & IMPD != 0 {
            return CommandKind::PowerDown;
        }

        match CalibrationKind::from_bits(byte >> CAL_SHIFT) {
            Some(kind) => CommandKind::Calibrate(kind),
            None => CommandKind::Convert {
                rate: byte & RATE_MASK,
            },
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value.0
    }
}
