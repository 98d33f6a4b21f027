#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;
mod error;

pub mod calibration;
pub mod command;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;
pub mod snapshot;

pub use crate::device::{Max11200, Sample};
pub use crate::error::{Error, Result};
