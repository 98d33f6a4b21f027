//! In-memory MAX11200 model used by the driver tests.
//!
//! Implements `SpiDevice` directly so the full driver stack runs against it:
//! command decoding, register file, RDY/MSTAT sequencing after a conversion
//! start, calibration results and byte-level fault injection.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation, SpiDevice};

use crate::command::{Access, Command, CommandKind};
use crate::params::CalibrationKind;
use crate::registers::{
    u24_from_be_bytes, u24_to_be_bytes, width_of, MAX_REGISTER, REG_DATA, REG_SCGC, REG_SCOC,
    REG_SGC, REG_SOC, REG_STAT1,
};

const RDY: u32 = 0x01;
const MSTAT: u32 = 0x02;

/// Transfer failure injected by the simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SimError;

impl spi::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Simulated MAX11200 behind its own chip-select.
#[derive(Debug, Default)]
pub(crate) struct SimulatedMax11200 {
    /// Register file indexed by address; 8-bit registers use the low byte.
    pub registers: [u32; (MAX_REGISTER + 1) as usize],
    /// Status reads reporting "measuring" after each conversion start.
    pub polls_until_ready: u32,
    /// Raw 24-bit code latched into DATA when a conversion finishes.
    pub conversion_result: u32,
    /// Values latched into SCOC/SCGC by a self-calibration.
    pub self_calibration: (u32, u32),
    /// Value latched into SOC or SGC by a system calibration.
    pub system_calibration: u32,
    /// Fail any payload read at this byte index.
    pub fail_read_at_byte: Option<usize>,
    /// Every command byte seen, one per transaction.
    pub log: Vec<u8>,
    /// Set once the power-down command arrives.
    pub powered_down: bool,
    pending_polls: Option<u32>,
    pending_rate: u8,
}

impl SimulatedMax11200 {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of transactions that used `command`.
    pub(crate) fn count(&self, command: Command) -> usize {
        self.log.iter().filter(|&&byte| byte == command.bits()).count()
    }

    fn register_bytes(&self, register: u8) -> [u8; 3] {
        let value = self.registers[register as usize];
        if width_of(register) == 1 {
            [value as u8, 0, 0]
        } else {
            u24_to_be_bytes(value)
        }
    }

    fn read_status(&mut self) -> u8 {
        match self.pending_polls {
            Some(0) => {
                self.pending_polls = None;
                self.registers[REG_DATA as usize] = self.conversion_result;
                let rate = (self.pending_rate as u32) << 4;
                let status = &mut self.registers[REG_STAT1 as usize];
                *status = (*status & !(MSTAT | 0x70)) | RDY | rate;
            }
            Some(remaining) => self.pending_polls = Some(remaining - 1),
            None => {}
        }
        self.registers[REG_STAT1 as usize] as u8
    }

    fn start(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::Convert { rate } => {
                let status = &mut self.registers[REG_STAT1 as usize];
                *status = (*status & !RDY) | MSTAT;
                self.pending_polls = Some(self.polls_until_ready);
                self.pending_rate = rate;
            }
            CommandKind::Calibrate(CalibrationKind::SelfCalibration) => {
                self.registers[REG_SCOC as usize] = self.self_calibration.0;
                self.registers[REG_SCGC as usize] = self.self_calibration.1;
            }
            CommandKind::Calibrate(CalibrationKind::SystemOffset) => {
                self.registers[REG_SOC as usize] = self.system_calibration;
            }
            CommandKind::Calibrate(CalibrationKind::SystemGain) => {
                self.registers[REG_SGC as usize] = self.system_calibration;
            }
            CommandKind::PowerDown => self.powered_down = true,
            CommandKind::Register { .. } => {}
        }
    }
}

impl ErrorType for SimulatedMax11200 {
    type Error = SimError;
}

impl SpiDevice for SimulatedMax11200 {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let (first, rest) = operations.split_first_mut().ok_or(SimError)?;
        let command = match first {
            Operation::Write(data) if data.len() == 1 => {
                Command::from_bits(data[0]).ok_or(SimError)?
            }
            _ => return Err(SimError),
        };
        self.log.push(command.bits());

        match command.kind() {
            CommandKind::Register { address, access } => {
                if address > MAX_REGISTER {
                    return Err(SimError);
                }
                match (access, rest.first_mut()) {
                    (Access::Read, Some(Operation::Read(buf))) => {
                        let bytes = if address == REG_STAT1 {
                            [self.read_status(), 0, 0]
                        } else {
                            self.register_bytes(address)
                        };
                        for (index, slot) in buf.iter_mut().enumerate() {
                            if self.fail_read_at_byte == Some(index) {
                                return Err(SimError);
                            }
                            *slot = bytes[index];
                        }
                        if address == REG_DATA {
                            self.registers[REG_STAT1 as usize] &= !RDY;
                        }
                    }
                    (Access::Write, Some(Operation::Write(data))) => {
                        let value = match data.len() {
                            1 => data[0] as u32,
                            3 => u24_from_be_bytes([data[0], data[1], data[2]]),
                            _ => return Err(SimError),
                        };
                        self.registers[address as usize] = value;
                    }
                    _ => return Err(SimError),
                }
            }
            kind => {
                if !rest.is_empty() {
                    return Err(SimError);
                }
                self.start(kind);
            }
        }

        Ok(())
    }
}

/// `DelayNs` implementation that only accumulates the requested time.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}
