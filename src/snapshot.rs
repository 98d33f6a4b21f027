//! Last-known register values for one device.
//!
//! The snapshot is updated whenever the driver reads or writes one of the
//! 8-bit registers. It is never authoritative: STAT1 changes on its own and
//! any register may change after a failed sequence. It only lets the driver
//! skip reads it can prove redundant.

use crate::params::ConversionMode;
use crate::registers::{Control1, Control2, Control3, Status};

/// Cached copies of `STAT1`, `CTRL1`, `CTRL2` and `CTRL3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// Last status read.
    pub status: Option<Status>,
    /// Last known `CTRL1`.
    pub control1: Option<Control1>,
    /// Last known `CTRL2`.
    pub control2: Option<Control2>,
    /// Last known `CTRL3`.
    pub control3: Option<Control3>,
}

impl RegisterSnapshot {
    /// Creates an empty snapshot; nothing is known about the device yet.
    pub const fn new() -> Self {
        Self {
            status: None,
            control1: None,
            control2: None,
            control3: None,
        }
    }

    /// Returns the cached conversion mode, if `CTRL1` is known.
    pub fn conversion_mode(&self) -> Option<ConversionMode> {
        self.control1.map(|ctrl1| ctrl1.conversion_mode())
    }

    /// Forgets everything.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_until_control1_cached() {
        let mut snapshot = RegisterSnapshot::new();
        assert_eq!(snapshot.conversion_mode(), None);

        snapshot.control1 = Some(Control1::from(0x02));
        assert_eq!(snapshot.conversion_mode(), Some(ConversionMode::SingleCycle));

        snapshot.invalidate();
        assert_eq!(snapshot, RegisterSnapshot::default());
    }
}
