//! Register map definitions for the MAX11200 ADC.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{
    ClockSource, ConversionMode, DataFormat, DigitalGain, GpioDirection, GpioPin, InputRange,
    LineFrequency, ReferenceBuffer, SignalBuffer,
};

/// Register address of `STAT1`.
pub const REG_STAT1: u8 = 0x00;
/// Register address of `CTRL1`.
pub const REG_CTRL1: u8 = 0x01;
/// Register address of `CTRL2`.
pub const REG_CTRL2: u8 = 0x02;
/// Register address of `CTRL3`.
pub const REG_CTRL3: u8 = 0x03;
/// Register address of `DATA`.
pub const REG_DATA: u8 = 0x04;
/// Register address of `SOC` (system offset calibration).
pub const REG_SOC: u8 = 0x05;
/// Register address of `SGC` (system gain calibration).
pub const REG_SGC: u8 = 0x06;
/// Register address of `SCOC` (self-calibration offset).
pub const REG_SCOC: u8 = 0x07;
/// Register address of `SCGC` (self-calibration gain).
pub const REG_SCGC: u8 = 0x08;

/// Highest valid register address.
pub const MAX_REGISTER: u8 = REG_SCGC;

/// Largest value a 24-bit register can hold.
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every 8-bit register value type.
pub trait Register: From<u8> + Into<u8> + Copy {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
}

/// Returns the access class of any register address, `None` if out of range.
pub const fn access_of(register: u8) -> Option<RegisterAccess> {
    match register {
        REG_STAT1 | REG_DATA => Some(RegisterAccess::ReadOnly),
        REG_CTRL1..=REG_CTRL3 | REG_SOC..=REG_SCGC => Some(RegisterAccess::ReadWrite),
        _ => None,
    }
}

/// Returns the payload width of a register in bytes.
pub const fn width_of(register: u8) -> usize {
    match register {
        REG_STAT1..=REG_CTRL3 => 1,
        _ => 3,
    }
}

/// The four 24-bit calibration registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationRegister {
    /// `SOC`, system offset calibration.
    SystemOffset,
    /// `SGC`, system gain calibration.
    SystemGain,
    /// `SCOC`, self-calibration offset.
    SelfOffset,
    /// `SCGC`, self-calibration gain.
    SelfGain,
}

impl CalibrationRegister {
    /// Returns the register address.
    pub const fn address(self) -> u8 {
        match self {
            Self::SystemOffset => REG_SOC,
            Self::SystemGain => REG_SGC,
            Self::SelfOffset => REG_SCOC,
            Self::SelfGain => REG_SCGC,
        }
    }
}

/// Bitfield representation of the `STAT1` register (address `0x00`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    // Conversion result available (bit 0).
    pub ready: bool,
    // Measurement in progress (bit 1).
    pub measuring: bool,
    // Result below the minimum code (bit 2).
    pub underrange: bool,
    // Result above the maximum code (bit 3).
    pub overrange: bool,
    // Rate code of the result held in DATA (bits 6:4).
    pub rate: B3,
    // System gain calibration overrange (bit 7).
    pub system_overrange: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `CTRL1` register (address `0x01`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control1 {
    #[skip]
    __: B1,
    // Single-cycle / continuous selection (bit 1).
    pub conversion_mode: ConversionMode,
    // Output data format (bit 2).
    pub format: DataFormat,
    // Signal buffer enable (bit 3).
    pub signal_buffer: SignalBuffer,
    // Reference buffer enable (bit 4).
    pub reference_buffer: ReferenceBuffer,
    // Clock source (bit 5).
    pub clock: ClockSource,
    // Unipolar / bipolar input range (bit 6).
    pub input_range: InputRange,
    // Line frequency rejection (bit 7).
    pub line_frequency: LineFrequency,
}

impl From<u8> for Control1 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Control1> for u8 {
    fn from(value: Control1) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `CTRL2` register (address `0x02`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control2 {
    // DIO1 level (bit 0).
    pub dio1: bool,
    // DIO2 level (bit 1).
    pub dio2: bool,
    // DIO3 level (bit 2).
    pub dio3: bool,
    // DIO4 level (bit 3).
    pub dio4: bool,
    // DIO1 direction (bit 4).
    pub dir1: GpioDirection,
    // DIO2 direction (bit 5).
    pub dir2: GpioDirection,
    // DIO3 direction (bit 6).
    pub dir3: GpioDirection,
    // DIO4 direction (bit 7).
    pub dir4: GpioDirection,
}

impl Control2 {
    /// Returns the direction of `pin`.
    pub fn direction(&self, pin: GpioPin) -> GpioDirection {
        match pin {
            GpioPin::Gpio1 => self.dir1(),
            GpioPin::Gpio2 => self.dir2(),
            GpioPin::Gpio3 => self.dir3(),
            GpioPin::Gpio4 => self.dir4(),
        }
    }

    /// Sets the direction of `pin`.
    pub fn set_direction(&mut self, pin: GpioPin, direction: GpioDirection) {
        match pin {
            GpioPin::Gpio1 => self.set_dir1(direction),
            GpioPin::Gpio2 => self.set_dir2(direction),
            GpioPin::Gpio3 => self.set_dir3(direction),
            GpioPin::Gpio4 => self.set_dir4(direction),
        }
    }

    /// Returns the level of `pin`.
    pub fn level(&self, pin: GpioPin) -> bool {
        match pin {
            GpioPin::Gpio1 => self.dio1(),
            GpioPin::Gpio2 => self.dio2(),
            GpioPin::Gpio3 => self.dio3(),
            GpioPin::Gpio4 => self.dio4(),
        }
    }

    /// Sets the output level of `pin`.
    pub fn set_level(&mut self, pin: GpioPin, high: bool) {
        match pin {
            GpioPin::Gpio1 => self.set_dio1(high),
            GpioPin::Gpio2 => self.set_dio2(high),
            GpioPin::Gpio3 => self.set_dio3(high),
            GpioPin::Gpio4 => self.set_dio4(high),
        }
    }
}

impl From<u8> for Control2 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Control2> for u8 {
    fn from(value: Control2) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `CTRL3` register (address `0x03`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control3 {
    #[skip]
    __: B1,
    // Ignore self-calibration offset (bit 1).
    pub no_self_offset: bool,
    // Ignore self-calibration gain (bit 2).
    pub no_self_gain: bool,
    // Ignore system offset (bit 3).
    pub no_system_offset: bool,
    // Ignore system gain (bit 4).
    pub no_system_gain: bool,
    // MAX11210 digital gain code (bits 7:5).
    pub digital_gain_bits: B3,
}

impl Control3 {
    /// Returns the decoded MAX11210 digital gain, `None` for reserved codes.
    pub fn digital_gain(&self) -> Option<DigitalGain> {
        DigitalGain::from_bits(self.digital_gain_bits())
    }

    /// Sets the MAX11210 digital gain.
    pub fn set_digital_gain(&mut self, gain: DigitalGain) {
        self.set_digital_gain_bits(gain as u8);
    }
}

impl From<u8> for Control3 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Control3> for u8 {
    fn from(value: Control3) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for Status {
    const ADDRESS: u8 = REG_STAT1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
}

impl Register for Control1 {
    const ADDRESS: u8 = REG_CTRL1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
}

impl Register for Control2 {
    const ADDRESS: u8 = REG_CTRL2;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
}

impl Register for Control3 {
    const ADDRESS: u8 = REG_CTRL3;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
}

/// Assembles three big-endian bytes into an unsigned 24-bit value.
pub const fn u24_from_be_bytes(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

/// Splits the low 24 bits of `value` into three big-endian bytes.
pub const fn u24_to_be_bytes(value: u32) -> [u8; 3] {
    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
}

/// Sign-extends a 24-bit two's complement value to 32 bits.
pub const fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
