//! This crate provides an interface for controlling the Korad KA3305P and KD3305P programmable bench power supplies.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! Both models have two programmable channels (0 - 30V, 0 - 5A each). They differ in how the outputs are switched:
//! * KA3305P - a single switch for all outputs.
//! * KD3305P - each channel output can be switched on its own. It also has a controllable beeper.
//!
//! The PSU speaks a plain ASCII command set (`VSET1:12.00`, `IOUT2?`, `STATUS?`, ...) over its USB-serial port.
//! Commands are sent without a terminator and each query is answered with a short reply.
//!
//! The serial port used for PSU comms should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Flow control: None
//!
//! With the `serial` feature enabled, [`serial::open`] opens a host serial port with these settings.

#![cfg_attr(feature = "no-std", no_std)]

pub mod command;
pub mod error;
pub mod model;
pub mod psu;
pub mod reply;
pub mod status;
pub mod types;

#[cfg(all(feature = "serial", not(feature = "no-std")))]
pub mod serial;

#[cfg(test)]
mod mock_serial;

pub use model::{Ka3305p, Kd3305p, Model};
pub use psu::{Ka3305pPsu, Kd3305pPsu, Psu};

/// Baud rate of the PSU serial port. It is fixed on these models.
pub const BAUD_RATE: u32 = 9600;
/// Number of data bits per character.
pub const DATA_BITS: u8 = 8;
/// Number of stop bits per character.
pub const STOP_BITS: u8 = 1;
