//! Bus interface abstraction for the MAX11200 driver.
//!
//! Each method is one bus transaction: chip-select stays asserted from the
//! command byte through the last payload byte and is released afterwards,
//! also when the transfer fails.

use crate::command::Command;

pub mod spi;

#[cfg(test)]
pub(crate) mod sim;

/// Abstraction over the low-level bus access required by the driver.
pub trait Max11200Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes a single 8-bit register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single 8-bit register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Reads a multi-byte register, most significant byte first.
    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Writes a multi-byte register, most significant byte first.
    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Sends a lone MODE0 command byte with no payload.
    fn send_command(&mut self, command: Command) -> core::result::Result<(), Self::Error>;
}
