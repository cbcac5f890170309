//! This module defines the ASCII command set understood by the Korad PSUs.
//!
//! Every [`Command`] renders its exact wire form through [`core::fmt::Display`]. Commands are sent as-is, with no
//! line terminator.

use core::fmt;

use crate::types::{Channel, Panel, State, TrackingMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `*IDN?` - Instrument identification.
    Identify,
    /// `VSET<X>:<NN.NN>` - Set the output voltage of a channel.
    SetVoltage { channel: Channel, voltage_mv: u32 },
    /// `VSET<X>?` - Get the voltage setting of a channel.
    GetVoltage(Channel),
    /// `VOUT<X>?` - Measure the output voltage of a channel.
    ReadVoltage(Channel),
    /// `ISET<X>:<N.NNN>` - Set the output current limit of a channel.
    SetCurrent { channel: Channel, current_ma: u32 },
    /// `ISET<X>?` - Get the current limit of a channel.
    GetCurrent(Channel),
    /// `IOUT<X>?` - Measure the output current of a channel.
    ReadCurrent(Channel),
    /// `OUT<B>` - Switch all outputs at once. (KA3305P.)
    Output(State),
    /// `OUT1:<B>\nOUT2:<B>` - Switch both channel outputs in one write. (KD3305P.)
    OutputAll(State),
    /// `OUT<X>:<B>` - Switch one channel output. (KD3305P.)
    ChannelOutput { channel: Channel, state: State },
    /// `OCP<B>` - Enable/disable over current protection.
    Ocp(State),
    /// `OCPSTE<X>:<N.NNN>` - Set the over current protection level of a channel.
    SetOcp { channel: Channel, current_ma: u32 },
    /// `OVP<B>` - Enable/disable over voltage protection.
    Ovp(State),
    /// `OVPSTE<X>:<NN.NNN>` - Set the over voltage protection level of a channel.
    SetOvp { channel: Channel, voltage_mv: u32 },
    /// `STATUS?` - Read the status byte.
    Status,
    /// `RCL<N>` - Recall panel settings.
    Recall(Panel),
    /// `SAV<N>` - Store panel settings.
    Save(Panel),
    /// `TRACK<N>` - Select the tracking mode.
    Track(TrackingMode),
    /// `BEEP<B>` - Enable/disable the beeper. (KD3305P.)
    Beep(State),
}

/// What the PSU sends back after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Setting commands are not acknowledged.
    None,
    /// A reply of a known number of bytes.
    Fixed(usize),
    /// Free text, ended by a newline or by the line going quiet.
    Text,
}

/// Length of a value reply, e.g. `12.34` or `1.234`.
pub const VALUE_REPLY_LEN: usize = 5;

impl Command {
    /// The reply this command produces.
    pub fn reply(&self) -> Reply {
        match self {
            Command::Identify => Reply::Text,
            Command::GetVoltage(_)
            | Command::ReadVoltage(_)
            | Command::GetCurrent(_)
            | Command::ReadCurrent(_) => Reply::Fixed(VALUE_REPLY_LEN),
            Command::Status => Reply::Fixed(1),
            _ => Reply::None,
        }
    }
}

/// Volts with two decimals, rounded to the nearest 10mV.
struct CentiVolts(u32);

impl fmt::Display for CentiVolts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centivolts = self.0.saturating_add(5) / 10;
        write!(f, "{}.{:02}", centivolts / 100, centivolts % 100)
    }
}

/// Milli-units printed as whole units with three decimals.
struct Milli(u32);

impl fmt::Display for Milli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Identify => f.write_str("*IDN?"),
            Command::SetVoltage {
                channel,
                voltage_mv,
            } => write!(f, "VSET{}:{}", channel as u8, CentiVolts(voltage_mv)),
            Command::GetVoltage(channel) => write!(f, "VSET{}?", channel as u8),
            Command::ReadVoltage(channel) => write!(f, "VOUT{}?", channel as u8),
            Command::SetCurrent {
                channel,
                current_ma,
            } => write!(f, "ISET{}:{}", channel as u8, Milli(current_ma)),
            Command::GetCurrent(channel) => write!(f, "ISET{}?", channel as u8),
            Command::ReadCurrent(channel) => write!(f, "IOUT{}?", channel as u8),
            Command::Output(state) => write!(f, "OUT{}", state as u8),
            Command::OutputAll(state) => {
                write!(f, "OUT1:{}\nOUT2:{}", state as u8, state as u8)
            }
            Command::ChannelOutput { channel, state } => {
                write!(f, "OUT{}:{}", channel as u8, state as u8)
            }
            Command::Ocp(state) => write!(f, "OCP{}", state as u8),
            Command::SetOcp {
                channel,
                current_ma,
            } => write!(f, "OCPSTE{}:{}", channel as u8, Milli(current_ma)),
            Command::Ovp(state) => write!(f, "OVP{}", state as u8),
            Command::SetOvp {
                channel,
                voltage_mv,
            } => write!(f, "OVPSTE{}:{}", channel as u8, Milli(voltage_mv)),
            Command::Status => f.write_str("STATUS?"),
            Command::Recall(panel) => write!(f, "RCL{}", panel as u8),
            Command::Save(panel) => write!(f, "SAV{}", panel as u8),
            Command::Track(mode) => write!(f, "TRACK{}", mode as u8),
            Command::Beep(state) => write!(f, "BEEP{}", state as u8),
        }
    }
}
