//! Calibration sequences for the MAX11200.
//!
//! Each sequence issues its calibration command, waits out the settle time
//! and reads back the registers the device filled in. The bus is released
//! between steps, so other devices on a shared bus keep working during the
//! settle delay.
//!
//! A sequence must run to completion. Starting a conversion or another
//! calibration before the result registers are read leaves them undefined.

use embedded_hal::delay::DelayNs;

use crate::command::Command;
use crate::config::MIN_CALIBRATION_SETTLE_MS;
use crate::device::Max11200;
use crate::error::Result;
use crate::interface::Max11200Interface;
use crate::params::CalibrationKind;
use crate::registers::CalibrationRegister;

/// Values produced by one self-calibration run.
///
/// Nothing is persisted; store them and restore with
/// [`Max11200::write_calibration`] if needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    /// `SCOC` contents.
    pub offset: u32,
    /// `SCGC` contents.
    pub gain: u32,
}

/// Executes the self-calibration sequence.
///
/// 1. Writes `CTRL3` with `NOSYSO` and `NOSYSG` set so stale system
///    calibration values do not leak into the measurement.
/// 2. Sends the self-calibration command.
/// 3. Waits [`Timing::calibration_settle_ms`](crate::config::Timing), at least 300 ms.
/// 4. Reads `SCOC` and `SCGC`.
///
/// Any failure aborts the sequence and drops the register snapshot.
pub fn run_self_calibration<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
) -> Result<CalibrationReport, CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    let result = self_calibration_sequence(device, delay);
    if result.is_err() {
        device.invalidate_snapshot();
    }
    result
}

/// Executes a system offset calibration and returns the new `SOC` value.
///
/// The zero-scale input must already be applied to the analog inputs.
pub fn run_system_offset_calibration<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
) -> Result<u32, CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    run_system_calibration(device, delay, CalibrationKind::SystemOffset)
}

/// Executes a system gain calibration and returns the new `SGC` value.
///
/// The full-scale input must already be applied to the analog inputs.
pub fn run_system_gain_calibration<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
) -> Result<u32, CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    run_system_calibration(device, delay, CalibrationKind::SystemGain)
}

fn self_calibration_sequence<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
) -> Result<CalibrationReport, CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    device.disable_system_corrections()?;
    start_and_settle(device, delay, CalibrationKind::SelfCalibration)?;

    let offset = device.read_calibration(CalibrationRegister::SelfOffset)?;
    let gain = device.read_calibration(CalibrationRegister::SelfGain)?;
    debug!("self-calibration done: offset={=u32:#x} gain={=u32:#x}", offset, gain);

    Ok(CalibrationReport { offset, gain })
}

fn run_system_calibration<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
    kind: CalibrationKind,
) -> Result<u32, CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    let register = match kind {
        CalibrationKind::SystemGain => CalibrationRegister::SystemGain,
        _ => CalibrationRegister::SystemOffset,
    };

    let result = start_and_settle(device, delay, kind)
        .and_then(|()| device.read_calibration(register));
    if result.is_err() {
        device.invalidate_snapshot();
    }
    result
}

fn start_and_settle<IFACE, CommE>(
    device: &mut Max11200<IFACE>,
    delay: &mut impl DelayNs,
    kind: CalibrationKind,
) -> Result<(), CommE>
where
    IFACE: Max11200Interface<Error = CommE>,
{
    device.send(Command::calibrate(kind))?;

    let settle_ms = device
        .timing()
        .calibration_settle_ms
        .max(MIN_CALIBRATION_SETTLE_MS);
    debug!("calibration started, settling {=u32} ms", settle_ms);
    delay.delay_ms(settle_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use crate::error::Error;
    use crate::interface::sim::{RecordingDelay, SimError, SimulatedMax11200};
    use crate::interface::spi::SpiInterface;
    use crate::params::{Corrections, DigitalGain};
    use crate::registers::{Control3, REG_CTRL3, REG_SCOC};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn simulated() -> Max11200<SpiInterface<SimulatedMax11200>> {
        Max11200::new_spi(SimulatedMax11200::new())
    }

    #[test]
    fn self_calibration_wire_sequence() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0xC7),
            SpiTransaction::read(0x00),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0xC6),
            SpiTransaction::write(0x18),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0x90),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0xCF),
            SpiTransaction::read_vec(vec![0x00, 0x00, 0x10]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write(0xD1),
            SpiTransaction::read_vec(vec![0x7F, 0xFF, 0xFF]),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut adc = Max11200::new_spi(spi.clone());
        let mut delay = RecordingDelay::default();

        let report = adc.run_self_calibration(&mut delay).unwrap();

        assert_eq!(report, CalibrationReport { offset: 0x00_0010, gain: 0x7F_FFFF });
        assert_eq!(delay.total_ns, 500 * 1_000_000);
        spi.done();
    }

    #[test]
    fn self_calibration_reports_device_values_after_settle() {
        let mut adc = simulated();
        adc.interface_mut().spi_mut().self_calibration = (0x00_0010, 0x7F_FFFF);
        let mut delay = RecordingDelay::default();

        let report = run_self_calibration(&mut adc, &mut delay).unwrap();

        assert_eq!(report.offset, 0x00_0010);
        assert_eq!(report.gain, 0x7F_FFFF);
        assert!(delay.total_ns >= 500 * 1_000_000);
        assert_eq!(delay.calls, 1);
        assert_eq!(
            adc.snapshot().control3,
            Some(Control3::new().with_no_system_offset(true).with_no_system_gain(true))
        );
    }

    #[test]
    fn self_calibration_keeps_cached_control3_bits() {
        let mut adc = simulated();
        adc.interface_mut().spi_mut().registers[REG_CTRL3 as usize] = 0x62;
        adc.configure_corrections(Corrections::default()).unwrap();

        run_self_calibration(&mut adc, &mut RecordingDelay::default()).unwrap();

        assert_eq!(adc.interface_mut().spi_mut().registers[REG_CTRL3 as usize], 0x7A);
    }

    #[test]
    fn self_calibration_reads_unknown_control3_before_writing() {
        let mut adc = simulated();
        adc.interface_mut().spi_mut().registers[REG_CTRL3 as usize] = 0x80;

        run_self_calibration(&mut adc, &mut RecordingDelay::default()).unwrap();

        let device = adc.interface_mut().spi_mut();
        assert_eq!(device.registers[REG_CTRL3 as usize], 0x98);
        assert_eq!(device.count(Command::read(REG_CTRL3)), 1);
        assert_eq!(
            adc.snapshot().control3.map(|ctrl3| ctrl3.digital_gain()),
            Some(Some(DigitalGain::X16))
        );
    }

    #[test]
    fn settle_never_drops_below_device_minimum() {
        let mut timing = Timing::default();
        timing.calibration_settle_ms = 10;
        let mut adc = simulated().with_timing(timing);
        let mut delay = RecordingDelay::default();

        run_self_calibration(&mut adc, &mut delay).unwrap();

        assert_eq!(delay.total_ns, MIN_CALIBRATION_SETTLE_MS as u64 * 1_000_000);
    }

    #[test]
    fn self_calibration_aborts_on_read_failure() {
        let mut adc = simulated();
        adc.interface_mut().spi_mut().fail_read_at_byte = Some(1);

        assert_eq!(
            run_self_calibration(&mut adc, &mut RecordingDelay::default()),
            Err(Error::Interface(SimError))
        );
        assert_eq!(adc.snapshot().control3, None);

        assert_eq!(
            adc.interface_mut().spi_mut().log,
            [0xC7, 0xC6, 0x90, 0xC0 | (REG_SCOC << 1) | 0x01]
        );
    }

    #[test]
    fn system_calibrations_read_their_register() {
        let mut adc = simulated();
        adc.interface_mut().spi_mut().system_calibration = 0x12_3456;
        let mut delay = RecordingDelay::default();

        assert_eq!(run_system_offset_calibration(&mut adc, &mut delay).unwrap(), 0x12_3456);
        assert_eq!(run_system_gain_calibration(&mut adc, &mut delay).unwrap(), 0x12_3456);

        let device = adc.interface_mut().spi_mut();
        assert_eq!(device.log, [0xA0, 0xCB, 0xB0, 0xCD]);
        assert_eq!(delay.calls, 2);
    }
}
