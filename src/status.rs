//! Decoding of the `STATUS?` reply byte.

use modular_bitfield::prelude::*;

use crate::types::{Channel, ControlMode, State, TrackingMode};

/// Raw layout of the status byte, least significant bit first.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    /// CH1 regulation: `0` - CC, `1` - CV.
    pub ch1_cv: bool,
    /// CH2 regulation: `0` - CC, `1` - CV.
    pub ch2_cv: bool,
    /// `00` - independent, `01` - series, `11` - parallel.
    pub tracking: B2,
    pub beep: bool,
    pub lock: bool,
    pub output: bool,
    #[skip]
    __: B1,
}

/// The decoded PSU status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub ch1_mode: ControlMode,
    pub ch2_mode: ControlMode,
    pub tracking: TrackingMode,
    pub beep: State,
    /// Front panel key lock.
    pub lock: State,
    pub output: State,
}

impl Status {
    /// Control mode of a single channel.
    pub fn mode(&self, channel: Channel) -> ControlMode {
        match channel {
            Channel::Ch1 => self.ch1_mode,
            Channel::Ch2 => self.ch2_mode,
        }
    }
}

fn control_mode(cv: bool) -> ControlMode {
    if cv { ControlMode::Cv } else { ControlMode::Cc }
}

impl From<StatusRegister> for Status {
    fn from(raw: StatusRegister) -> Self {
        let tracking = match raw.tracking() {
            0b01 => TrackingMode::Series,
            0b11 => TrackingMode::Parallel,
            // `10` is not documented.
            _ => TrackingMode::Independent,
        };
        Status {
            ch1_mode: control_mode(raw.ch1_cv()),
            ch2_mode: control_mode(raw.ch2_cv()),
            tracking,
            beep: raw.beep().into(),
            lock: raw.lock().into(),
            output: raw.output().into(),
        }
    }
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        Status::from(StatusRegister::from_bytes([byte]))
    }
}
