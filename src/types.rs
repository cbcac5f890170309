//! This module contains the value types used in the PSU command set.

use strum_macros::EnumIter;

/// One of the two programmable output channels.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Channel {
    Ch1 = 1,
    Ch2 = 2,
}

impl From<Channel> for u8 {
    fn from(value: Channel) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Channel::Ch1),
            2 => Ok(Channel::Ch2),
            other => Err(other),
        }
    }
}

/// Stored panel settings. The PSU has five memory slots, `M1` - `M5`.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Panel {
    M1 = 1,
    M2 = 2,
    M3 = 3,
    M4 = 4,
    M5 = 5,
}

impl From<Panel> for u8 {
    fn from(value: Panel) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Panel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Panel as P;
        match value {
            1 => Ok(P::M1),
            2 => Ok(P::M2),
            3 => Ok(P::M3),
            4 => Ok(P::M4),
            5 => Ok(P::M5),
            other => Err(other),
        }
    }
}

/// How the two channels are combined.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy, Default)]
#[repr(u8)]
pub enum TrackingMode {
    /// Both channels are independent.
    #[default]
    Independent = 0,
    /// CH1 and CH2 in series, CH1 is the master.
    Series = 1,
    /// CH1 and CH2 in parallel, CH1 is the master.
    Parallel = 2,
}

impl TryFrom<u8> for TrackingMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TrackingMode::Independent),
            1 => Ok(TrackingMode::Series),
            2 => Ok(TrackingMode::Parallel),
            other => Err(other),
        }
    }
}

/// Represents the two possible power supply control modes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ControlMode {
    /// Constant voltage regulation mode.
    Cv,
    /// Constant current regulation mode.
    Cc,
}

/// Used to be less ambiguous and whether something is on or off.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy, Default)]
#[repr(u8)]
pub enum State {
    /// Disabled.
    #[default]
    Off = 0,
    /// Enabled.
    On = 1,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}
