//! Configuration primitives for the MAX11200 driver.

use crate::params::{
    ClockSource, ConversionMode, DataFormat, InputRange, LineFrequency, ReferenceBuffer,
    SignalBuffer,
};
use crate::registers::Control1;

/// Minimum settle time the device needs after a calibration command (milliseconds).
pub const MIN_CALIBRATION_SETTLE_MS: u32 = 300;

/// User-facing view of the `CTRL1` register.
///
/// Every field owns one bit of `CTRL1`; bit 0 is unused and always encodes as
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Single-cycle or continuous conversions.
    pub conversion_mode: ConversionMode,
    /// Output data format.
    pub format: DataFormat,
    /// Input signal buffer enable.
    pub signal_buffer: SignalBuffer,
    /// Reference buffer enable.
    pub reference_buffer: ReferenceBuffer,
    /// Clock source.
    pub clock: ClockSource,
    /// Unipolar or bipolar input range.
    pub input_range: InputRange,
    /// Line frequency rejection.
    pub line_frequency: LineFrequency,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Decodes a raw `CTRL1` value. Any byte is accepted.
    pub fn decode(raw: u8) -> Self {
        Self::from(Control1::from(raw))
    }

    /// Encodes the configuration as a raw `CTRL1` value.
    pub fn encode(&self) -> u8 {
        u8::from(Control1::from(*self))
    }
}

impl From<Control1> for Config {
    fn from(ctrl1: Control1) -> Self {
        Self {
            conversion_mode: ctrl1.conversion_mode(),
            format: ctrl1.format(),
            signal_buffer: ctrl1.signal_buffer(),
            reference_buffer: ctrl1.reference_buffer(),
            clock: ctrl1.clock(),
            input_range: ctrl1.input_range(),
            line_frequency: ctrl1.line_frequency(),
        }
    }
}

impl From<Config> for Control1 {
    fn from(config: Config) -> Self {
        Control1::new()
            .with_conversion_mode(config.conversion_mode)
            .with_format(config.format)
            .with_signal_buffer(config.signal_buffer)
            .with_reference_buffer(config.reference_buffer)
            .with_clock(config.clock)
            .with_input_range(config.input_range)
            .with_line_frequency(config.line_frequency)
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the conversion mode.
    pub fn conversion_mode(mut self, mode: ConversionMode) -> Self {
        self.config.conversion_mode = mode;
        self
    }

    /// Overrides the output data format.
    pub fn format(mut self, format: DataFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Enables or disables the signal buffers.
    pub fn signal_buffer(mut self, buffer: SignalBuffer) -> Self {
        self.config.signal_buffer = buffer;
        self
    }

    /// Enables or disables the reference buffers.
    pub fn reference_buffer(mut self, buffer: ReferenceBuffer) -> Self {
        self.config.reference_buffer = buffer;
        self
    }

    /// Selects the clock source.
    pub fn clock(mut self, clock: ClockSource) -> Self {
        self.config.clock = clock;
        self
    }

    /// Selects the input range.
    pub fn input_range(mut self, range: InputRange) -> Self {
        self.config.input_range = range;
        self
    }

    /// Selects the line frequency rejection.
    pub fn line_frequency(mut self, frequency: LineFrequency) -> Self {
        self.config.line_frequency = frequency;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conversion_mode: ConversionMode::SingleCycle,
            format: DataFormat::OffsetBinary,
            signal_buffer: SignalBuffer::Disabled,
            reference_buffer: ReferenceBuffer::Disabled,
            clock: ClockSource::Internal,
            input_range: InputRange::Unipolar,
            line_frequency: LineFrequency::Hz50,
        }
    }
}

/// Driver timing policy for the blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Pause between two status polls (microseconds).
    pub poll_interval_us: u32,
    /// Status polls attempted before giving up with [`Error::Timeout`](crate::Error::Timeout).
    /// Zero behaves like one: the status is always read at least once.
    pub max_polls: u32,
    /// Wait between a calibration command and reading its result (milliseconds).
    pub calibration_settle_ms: u32,
}

impl Timing {
    /// Overrides the poll budget.
    pub fn with_polling(mut self, interval_us: u32, max_polls: u32) -> Self {
        self.poll_interval_us = interval_us;
        self.max_polls = max_polls;
        self
    }

    /// Overrides the calibration settle time, never going below the device minimum.
    pub fn with_calibration_settle_ms(mut self, settle_ms: u32) -> Self {
        self.calibration_settle_ms = settle_ms.max(MIN_CALIBRATION_SETTLE_MS);
        self
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval_us: 1_000,
            // 1 sps single-cycle conversions take about a second.
            max_polls: 2_500,
            calibration_settle_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_power_up_baseline() {
        let config = Config::default();
        assert_eq!(config.conversion_mode, ConversionMode::SingleCycle);
        assert_eq!(config.format, DataFormat::OffsetBinary);
        assert_eq!(config.signal_buffer, SignalBuffer::Disabled);
        assert_eq!(config.reference_buffer, ReferenceBuffer::Disabled);
        assert_eq!(config.clock, ClockSource::Internal);
        assert_eq!(config.input_range, InputRange::Unipolar);
        assert_eq!(config.line_frequency, LineFrequency::Hz50);
        assert_eq!(config.encode(), 0b1100_0110);
    }

    #[test]
    fn encode_is_or_of_field_bits() {
        let base = Config::new()
            .conversion_mode(ConversionMode::Continuous)
            .format(DataFormat::TwosComplement)
            .input_range(InputRange::Bipolar)
            .line_frequency(LineFrequency::Hz60)
            .build();
        assert_eq!(base.encode(), 0x00);

        let fields = [
            (Config { conversion_mode: ConversionMode::SingleCycle, ..base }, 1 << 1),
            (Config { format: DataFormat::OffsetBinary, ..base }, 1 << 2),
            (Config { signal_buffer: SignalBuffer::Enabled, ..base }, 1 << 3),
            (Config { reference_buffer: ReferenceBuffer::Enabled, ..base }, 1 << 4),
            (Config { clock: ClockSource::External, ..base }, 1 << 5),
            (Config { input_range: InputRange::Unipolar, ..base }, 1 << 6),
            (Config { line_frequency: LineFrequency::Hz50, ..base }, 1 << 7),
        ];
        for (config, bit) in fields {
            assert_eq!(config.encode(), bit);
        }
    }

    #[test]
    fn decode_encode_roundtrip_over_defined_bits() {
        for raw in 0..=u8::MAX {
            let config = Config::decode(raw);
            assert_eq!(config.encode(), raw & !0x01);
            assert_eq!(Config::decode(config.encode()), config);
        }
    }

    #[test]
    fn calibration_settle_is_clamped_to_minimum() {
        let timing = Timing::default().with_calibration_settle_ms(100);
        assert_eq!(timing.calibration_settle_ms, MIN_CALIBRATION_SETTLE_MS);

        let timing = Timing::default().with_calibration_settle_ms(800);
        assert_eq!(timing.calibration_settle_ms, 800);
    }
}
