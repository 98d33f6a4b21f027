//! High-level MAX11200 device driver implementation.

use crate::calibration::{self, CalibrationReport};
use crate::command::Command;
use crate::config::{Config, Timing};
use crate::error::{Error, Result};
use crate::interface::spi::SpiInterface;
use crate::interface::Max11200Interface;
use crate::params::{
    ContinuousRate, ConversionMode, Corrections, DataFormat, DigitalGain, GpioDirection, GpioPin,
    SingleCycleRate,
};
use crate::registers::{
    sign_extend_24, u24_from_be_bytes, u24_to_be_bytes, CalibrationRegister, Control1, Control2,
    Control3, Register, Status, REG_CTRL1, REG_CTRL2, REG_CTRL3, REG_DATA, U24_MAX,
};
use crate::snapshot::RegisterSnapshot;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// One conversion result as read from `DATA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Raw code widened to 32 bits; sign-extended in two's complement format.
    pub value: i32,
    /// `STAT1.OR` reported with the result.
    pub overrange: bool,
    /// `STAT1.UR` reported with the result.
    pub underrange: bool,
}

/// High-level synchronous driver for the MAX11200 ADC.
///
/// The driver owns its register snapshot, so two drivers never share cached
/// state even when their interfaces share a bus.
pub struct Max11200<IFACE> {
    interface: IFACE,
    snapshot: RegisterSnapshot,
    timing: Timing,
}

impl<IFACE> Max11200<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE) -> Self {
        Self {
            interface,
            snapshot: RegisterSnapshot::new(),
            timing: Timing::default(),
        }
    }

    /// Replaces the timing policy.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> IFACE {
        self.interface
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the cached register values.
    pub fn snapshot(&self) -> &RegisterSnapshot {
        &self.snapshot
    }

    /// Returns the active timing policy.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Returns the configuration as last read or written, without bus traffic.
    pub fn cached_config(&self) -> Option<Config> {
        self.snapshot.control1.map(Config::from)
    }

    pub(crate) fn invalidate_snapshot(&mut self) {
        self.snapshot.invalidate();
    }
}

impl<SPI> Max11200<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiInterface::new(spi))
    }

    /// Releases the driver, returning the SPI device.
    pub fn release_spi(self) -> SPI {
        self.release().release()
    }
}

impl<IFACE, CommE> Max11200<IFACE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization & Configuration ================================
    // ==================================================================
    /// Writes `config` and seeds the snapshot from the remaining registers.
    pub fn init(&mut self, config: Config) -> Result<(), CommE> {
        self.snapshot.invalidate();
        self.write_config(config)?;
        self.read_status()?;
        let ctrl2 = self.read_bitfield::<Control2>()?;
        self.snapshot.control2 = Some(ctrl2);
        let ctrl3 = self.read_bitfield::<Control3>()?;
        self.snapshot.control3 = Some(ctrl3);
        debug!("max11200 initialised, ctrl1={=u8:#x}", config.encode());
        Ok(())
    }

    /// Reads `CTRL1` from the device.
    pub fn read_config(&mut self) -> Result<Config, CommE> {
        let ctrl1 = self.read_bitfield::<Control1>()?;
        self.snapshot.control1 = Some(ctrl1);
        Ok(Config::from(ctrl1))
    }

    /// Writes `config` to `CTRL1` in one transaction.
    pub fn write_config(&mut self, config: Config) -> Result<(), CommE> {
        let ctrl1 = Control1::from(config);
        self.write_bitfield(ctrl1)?;
        self.snapshot.control1 = Some(ctrl1);
        Ok(())
    }

    // ==================================================================
    // == Status ========================================================
    // ==================================================================
    /// Reads `STAT1`. Overrange and underrange flags are data, not errors.
    pub fn read_status(&mut self) -> Result<Status, CommE> {
        let status = self.read_bitfield::<Status>()?;
        self.snapshot.status = Some(status);
        Ok(status)
    }

    /// Returns `STAT1.MSTAT` from a fresh status read.
    pub fn measure_in_progress(&mut self) -> Result<bool, CommE> {
        Ok(self.read_status()?.measuring())
    }

    /// Returns `STAT1.RDY` from a fresh status read.
    pub fn conversion_ready(&mut self) -> Result<bool, CommE> {
        Ok(self.read_status()?.ready())
    }

    // ==================================================================
    // == Conversions ===================================================
    // ==================================================================
    /// Starts one single-cycle conversion at `rate`.
    ///
    /// Rate codes are only meaningful in single-cycle mode, so the driver
    /// forces `CTRL1.SCYCLE` first. When the snapshot already shows
    /// single-cycle mode only the start command is sent; otherwise `CTRL1` is
    /// re-read from the device, the bit set, and the register written back.
    pub fn start_conversion(&mut self, rate: SingleCycleRate) -> Result<(), CommE> {
        self.ensure_conversion_mode(ConversionMode::SingleCycle)?;
        trace!("single-cycle conversion, rate code {=u8}", rate.code());
        self.send(Command::convert(rate.code()))
    }

    /// Switches to continuous conversions at `rate`.
    ///
    /// Results are then collected with [`wait_ready`](Self::wait_ready) and
    /// [`read_data`](Self::read_data).
    pub fn start_continuous(&mut self, rate: ContinuousRate) -> Result<(), CommE> {
        self.ensure_conversion_mode(ConversionMode::Continuous)?;
        trace!("continuous conversions, rate code {=u8}", rate.code());
        self.send(Command::convert(rate.code()))
    }

    /// Polls `STAT1` until `RDY` is set, pausing between polls.
    ///
    /// Gives up with [`Error::Timeout`] after [`Timing::max_polls`] reads,
    /// without a pause after the last one. A budget of zero still reads the
    /// status once.
    pub fn wait_ready(&mut self, delay: &mut impl DelayNs) -> Result<Status, CommE> {
        let max_polls = self.timing.max_polls.max(1);
        let mut polls = 0;
        loop {
            let status = self.read_status()?;
            if status.ready() {
                return Ok(status);
            }

            polls += 1;
            if polls >= max_polls {
                break;
            }
            delay.delay_us(self.timing.poll_interval_us);
        }

        warn!("conversion not ready after {=u32} polls", max_polls);
        Err(Error::Timeout)
    }

    /// Reads `DATA`, widening it according to the output format.
    ///
    /// The format comes from the snapshot; `CTRL1` is read first if unknown.
    pub fn read_data(&mut self) -> Result<i32, CommE> {
        let format = match self.snapshot.control1 {
            Some(ctrl1) => ctrl1.format(),
            None => self.read_config()?.format,
        };

        let raw = self.read_register24(REG_DATA)?;
        Ok(match format {
            DataFormat::TwosComplement => sign_extend_24(raw),
            DataFormat::OffsetBinary => raw as i32,
        })
    }

    /// Runs one blocking single-cycle conversion: start, poll, read.
    ///
    /// On failure the snapshot is dropped; rewrite the configuration before
    /// retrying.
    pub fn convert(&mut self, rate: SingleCycleRate, delay: &mut impl DelayNs) -> Result<Sample, CommE> {
        let result = self.convert_once(rate, delay);
        if result.is_err() {
            self.snapshot.invalidate();
        }
        result
    }

    fn convert_once(&mut self, rate: SingleCycleRate, delay: &mut impl DelayNs) -> Result<Sample, CommE> {
        self.start_conversion(rate)?;
        let status = self.wait_ready(delay)?;
        let value = self.read_data()?;
        Ok(Sample {
            value,
            overrange: status.overrange(),
            underrange: status.underrange(),
        })
    }

    /// Puts the device into power-down; the next command wakes it.
    pub fn power_down(&mut self) -> Result<(), CommE> {
        self.send(Command::power_down())
    }

    // ==================================================================
    // == Calibration ===================================================
    // ==================================================================
    /// Runs the self-calibration sequence.
    ///
    /// See [`calibration::run_self_calibration`].
    pub fn run_self_calibration(&mut self, delay: &mut impl DelayNs) -> Result<CalibrationReport, CommE> {
        calibration::run_self_calibration(self, delay)
    }

    /// Reads one 24-bit calibration register.
    pub fn read_calibration(&mut self, register: CalibrationRegister) -> Result<u32, CommE> {
        self.read_register24(register.address())
    }

    /// Writes one 24-bit calibration register, e.g. to restore stored values.
    pub fn write_calibration(&mut self, register: CalibrationRegister, value: u32) -> Result<(), CommE> {
        self.write_register24(register.address(), value)
    }

    /// Selects which calibration values the device applies to its results.
    ///
    /// Fields left at `None` keep their current `CTRL3` bit.
    pub fn configure_corrections(&mut self, corrections: Corrections) -> Result<(), CommE> {
        self.update_control3(|ctrl3| {
            if let Some(apply) = corrections.self_offset {
                ctrl3.set_no_self_offset(!apply);
            }

            if let Some(apply) = corrections.self_gain {
                ctrl3.set_no_self_gain(!apply);
            }

            if let Some(apply) = corrections.system_offset {
                ctrl3.set_no_system_offset(!apply);
            }

            if let Some(apply) = corrections.system_gain {
                ctrl3.set_no_system_gain(!apply);
            }
        })
    }

    /// Sets the MAX11210 digital gain; the MAX11200 ignores these bits.
    pub fn set_digital_gain(&mut self, gain: DigitalGain) -> Result<(), CommE> {
        self.update_control3(|ctrl3| ctrl3.set_digital_gain(gain))
    }

    /// Writes `CTRL3` with both system corrections disabled, keeping the
    /// other bits. `CTRL3` is read first when the snapshot does not hold it.
    pub(crate) fn disable_system_corrections(&mut self) -> Result<(), CommE> {
        let current = match self.snapshot.control3 {
            Some(ctrl3) => ctrl3,
            None => self.read_bitfield::<Control3>()?,
        };
        let ctrl3 = current
            .with_no_system_offset(true)
            .with_no_system_gain(true);
        self.write_bitfield(ctrl3)?;
        self.snapshot.control3 = Some(ctrl3);
        Ok(())
    }

    // ==================================================================
    // == GPIO ==========================================================
    // ==================================================================
    /// Configures `pin` as input or output.
    pub fn set_gpio_direction(&mut self, pin: GpioPin, direction: GpioDirection) -> Result<(), CommE> {
        self.update_control2(|ctrl2| ctrl2.set_direction(pin, direction))
    }

    /// Drives an output `pin`.
    pub fn set_gpio_level(&mut self, pin: GpioPin, high: bool) -> Result<(), CommE> {
        self.update_control2(|ctrl2| ctrl2.set_level(pin, high))
    }

    /// Samples `pin` with a fresh `CTRL2` read.
    pub fn read_gpio(&mut self, pin: GpioPin) -> Result<bool, CommE> {
        let ctrl2 = self.read_bitfield::<Control2>()?;
        self.snapshot.control2 = Some(ctrl2);
        Ok(ctrl2.level(pin))
    }

    // ==================================================================
    // == Raw Register Access ===========================================
    // ==================================================================
    /// Reads an 8-bit register without touching the snapshot.
    pub fn read_register8(&mut self, register: u8) -> Result<u8, CommE> {
        self.interface.read_register(register).map_err(Error::from)
    }

    /// Writes an 8-bit register.
    ///
    /// Writes to `CTRL1`..`CTRL3` replace the cached copy so later mode checks
    /// see the new value.
    pub fn write_register8(&mut self, register: u8, value: u8) -> Result<(), CommE> {
        self.interface
            .write_register(register, value)
            .map_err(Error::from)?;

        match register {
            REG_CTRL1 => self.snapshot.control1 = Some(Control1::from(value)),
            REG_CTRL2 => self.snapshot.control2 = Some(Control2::from(value)),
            REG_CTRL3 => self.snapshot.control3 = Some(Control3::from(value)),
            _ => {}
        }
        Ok(())
    }

    /// Reads a 24-bit register as an unsigned value, most significant byte first.
    pub fn read_register24(&mut self, register: u8) -> Result<u32, CommE> {
        let mut raw = [0u8; 3];
        self.interface
            .read_many(register, &mut raw)
            .map_err(Error::from)?;
        Ok(u24_from_be_bytes(raw))
    }

    /// Writes the low 24 bits of `value` to a 24-bit register.
    pub fn write_register24(&mut self, register: u8, value: u32) -> Result<(), CommE> {
        let raw = u24_to_be_bytes(value & U24_MAX);
        self.interface
            .write_many(register, &raw)
            .map_err(Error::from)
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    pub(crate) fn send(&mut self, command: Command) -> Result<(), CommE> {
        self.interface.send_command(command).map_err(Error::from)
    }

    fn read_bitfield<R: Register>(&mut self) -> Result<R, CommE> {
        let raw = self
            .interface
            .read_register(R::ADDRESS)
            .map_err(Error::from)?;
        Ok(R::from(raw))
    }

    fn write_bitfield<R: Register>(&mut self, value: R) -> Result<(), CommE> {
        let raw: u8 = value.into();
        trace!("write reg {=u8} <- {=u8:#x}", R::ADDRESS, raw);
        self.interface
            .write_register(R::ADDRESS, raw)
            .map_err(Error::from)
    }

    fn ensure_conversion_mode(&mut self, mode: ConversionMode) -> Result<(), CommE> {
        if self.snapshot.conversion_mode() == Some(mode) {
            return Ok(());
        }

        // The cache may be stale, so decide on a fresh read.
        let current = self.read_bitfield::<Control1>()?;
        let updated = current.with_conversion_mode(mode);
        if updated != current {
            self.write_bitfield(updated)?;
        }

        self.snapshot.control1 = Some(updated);
        Ok(())
    }

    fn update_control2<F>(&mut self, mut mutate: F) -> Result<(), CommE>
    where
        F: FnMut(&mut Control2),
    {
        let current = self.read_bitfield::<Control2>()?;

        let mut ctrl2 = current;
        mutate(&mut ctrl2);

        if ctrl2 != current {
            self.write_bitfield(ctrl2)?;
        }

        self.snapshot.control2 = Some(ctrl2);
        Ok(())
    }

    fn update_control3<F>(&mut self, mut mutate: F) -> Result<(), CommE>
    where
        F: FnMut(&mut Control3),
    {
        let current = self.read_bitfield::<Control3>()?;

        let mut ctrl3 = current;
        mutate(&mut ctrl3);

        if ctrl3 != current {
            self.write_bitfield(ctrl3)?;
        }

        self.snapshot.control3 = Some(ctrl3);
        Ok(())
    }
}
