//! Strongly typed parameter enumerations for the MAX11200 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the high-level driver APIs. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use max11200::params::{ConversionMode, DataFormat, SingleCycleRate};
//!
//! let mode = ConversionMode::SingleCycle;
//! let format = DataFormat::TwosComplement;
//! let rate = SingleCycleRate::Sps10;
//! let _ = (mode, format, rate);
//! ```

use modular_bitfield::prelude::Specifier;

/// Conversion cycle selection (`CTRL1.SCYCLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum ConversionMode {
    /// Free-running, latent continuous conversions.
    Continuous = 0,
    /// One no-latency conversion per start command.
    SingleCycle = 1,
}

/// Digital output format (`CTRL1.FORMAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum DataFormat {
    /// Two's complement output.
    TwosComplement = 0,
    /// Offset binary output.
    OffsetBinary = 1,
}

/// Input signal buffer enable (`CTRL1.SIGBUF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum SignalBuffer {
    /// Signal buffers bypassed.
    Disabled = 0,
    /// Signal buffers enabled.
    Enabled = 1,
}

/// Reference buffer enable (`CTRL1.REFBUF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum ReferenceBuffer {
    /// Reference buffers bypassed.
    Disabled = 0,
    /// Reference buffers enabled.
    Enabled = 1,
}

/// System clock source (`CTRL1.EXTCLK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum ClockSource {
    /// Internal oscillator.
    Internal = 0,
    /// External clock on the CLK pin.
    External = 1,
}

/// Input range polarity (`CTRL1.U/~B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum InputRange {
    /// Bipolar input range.
    Bipolar = 0,
    /// Unipolar input range.
    Unipolar = 1,
}

/// Power-line rejection frequency (`CTRL1.LINEF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum LineFrequency {
    /// 60 Hz mains rejection.
    Hz60 = 0,
    /// 50 Hz mains rejection.
    Hz50 = 1,
}

/// Conversion rates accepted in single-cycle mode (`RATE[2:0]`).
///
/// Nominal values assume 60 Hz line rejection; with [`LineFrequency::Hz50`]
/// the device scales every rate by 5/6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SingleCycleRate {
    /// 1 sample per second.
    Sps1 = 0b000,
    /// 2.5 samples per second.
    Sps2_5 = 0b001,
    /// 5 samples per second.
    Sps5 = 0b010,
    /// 10 samples per second.
    Sps10 = 0b011,
    /// 15 samples per second.
    Sps15 = 0b100,
    /// 30 samples per second.
    Sps30 = 0b101,
    /// 60 samples per second.
    Sps60 = 0b110,
    /// 120 samples per second.
    Sps120 = 0b111,
}

impl SingleCycleRate {
    /// Returns the `RATE[2:0]` code placed in the conversion command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the nominal rate in millisamples per second.
    pub const fn millisamples_per_second(self) -> u32 {
        match self {
            Self::Sps1 => 1_000,
            Self::Sps2_5 => 2_500,
            Self::Sps5 => 5_000,
            Self::Sps10 => 10_000,
            Self::Sps15 => 15_000,
            Self::Sps30 => 30_000,
            Self::Sps60 => 60_000,
            Self::Sps120 => 120_000,
        }
    }
}

/// Conversion rates accepted in continuous mode (`RATE[2:0]` = `1xx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ContinuousRate {
    /// 60 samples per second.
    Sps60 = 0b100,
    /// 120 samples per second.
    Sps120 = 0b101,
    /// 240 samples per second.
    Sps240 = 0b110,
    /// 480 samples per second.
    Sps480 = 0b111,
}

impl ContinuousRate {
    /// Returns the `RATE[2:0]` code placed in the conversion command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the nominal rate in samples per second.
    pub const fn samples_per_second(self) -> u32 {
        match self {
            Self::Sps60 => 60,
            Self::Sps120 => 120,
            Self::Sps240 => 240,
            Self::Sps480 => 480,
        }
    }
}

/// Calibration selector carried in the `CAL[1:0]` bits of a MODE0 command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CalibrationKind {
    /// Internal zero-scale and full-scale self-calibration.
    SelfCalibration = 0b01,
    /// System offset calibration against the applied zero-scale input.
    SystemOffset = 0b10,
    /// System gain calibration against the applied full-scale input.
    SystemGain = 0b11,
}

impl CalibrationKind {
    /// Decodes a `CAL[1:0]` selector; `0b00` is a plain conversion.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0b01 => Some(Self::SelfCalibration),
            0b10 => Some(Self::SystemOffset),
            0b11 => Some(Self::SystemGain),
            _ => None,
        }
    }
}

/// Digital gain selection (`CTRL3.DGAIN[2:0]`, MAX11210 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DigitalGain {
    /// Gain of 1.
    X1 = 0b000,
    /// Gain of 2.
    X2 = 0b001,
    /// Gain of 4.
    X4 = 0b010,
    /// Gain of 8.
    X8 = 0b011,
    /// Gain of 16.
    X16 = 0b100,
}

impl DigitalGain {
    /// Decodes the raw field; reserved codes map to `None`.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b111 {
            0b000 => Some(Self::X1),
            0b001 => Some(Self::X2),
            0b010 => Some(Self::X4),
            0b011 => Some(Self::X8),
            0b100 => Some(Self::X16),
            _ => None,
        }
    }

    /// Returns the multiplication factor.
    pub const fn factor(self) -> u8 {
        1 << (self as u8)
    }
}

/// Calibration corrections applied to conversion results (`CTRL3.NO*`).
///
/// `Some(true)` applies a correction, `Some(false)` bypasses it and `None`
/// leaves the device setting as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Corrections {
    /// Self-calibration offset (`NOSCO`).
    pub self_offset: Option<bool>,
    /// Self-calibration gain (`NOSCG`).
    pub self_gain: Option<bool>,
    /// System offset (`NOSYSO`).
    pub system_offset: Option<bool>,
    /// System gain (`NOSYSG`).
    pub system_gain: Option<bool>,
}

/// General-purpose I/O pins controlled through `CTRL2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPin {
    /// DIO1.
    Gpio1,
    /// DIO2.
    Gpio2,
    /// DIO3.
    Gpio3,
    /// DIO4.
    Gpio4,
}

/// Direction of a GPIO pin (`CTRL2.DIR[4:1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum GpioDirection {
    /// Pin configured as input.
    Input = 0,
    /// Pin configured as output.
    Output = 1,
}
