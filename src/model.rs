//! Per-model properties of the supported PSUs.
//!
//! The KA3305P and KD3305P share the same channels, ranges and most of the command set. Where they differ is how the
//! outputs are switched, which is captured by [`Model::output_command`].

use fugit::MillisDurationU32;

use crate::{
    command::Command,
    types::{Channel, State},
};

/// Describes one PSU model. Implemented by the marker types [`Ka3305p`] and [`Kd3305p`].
pub trait Model {
    /// Model name as shown in the `*IDN?` reply.
    const NAME: &'static str;
    /// Programmable channels.
    const CHANNELS: &'static [Channel];
    /// Highest voltage setting of a channel, in millivolts.
    const MAX_VOLTAGE_MV: u32;
    /// Highest current setting of a channel, in milliamps.
    const MAX_CURRENT_MA: u32;
    /// How long the PSU needs to apply a new setting before it reliably accepts the next command.
    const SETTLE_TIME: MillisDurationU32 = MillisDurationU32::millis(100);

    /// Command to switch every output on or off.
    fn output_command(state: State) -> Command;

    /// Look up channel `index` on this model.
    fn channel(index: u8) -> Option<Channel> {
        Self::CHANNELS
            .iter()
            .copied()
            .find(|c| u8::from(*c) == index)
    }
}

/// Korad KA3305P. Two channels behind a single output switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ka3305p;

impl Model for Ka3305p {
    const NAME: &'static str = "KA3305P";
    const CHANNELS: &'static [Channel] = &[Channel::Ch1, Channel::Ch2];
    const MAX_VOLTAGE_MV: u32 = 30_000;
    const MAX_CURRENT_MA: u32 = 5_000;

    fn output_command(state: State) -> Command {
        Command::Output(state)
    }
}

/// Korad KD3305P. Two channels, each with its own output switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kd3305p;

impl Model for Kd3305p {
    const NAME: &'static str = "KD3305P";
    const CHANNELS: &'static [Channel] = &[Channel::Ch1, Channel::Ch2];
    const MAX_VOLTAGE_MV: u32 = 30_000;
    const MAX_CURRENT_MA: u32 = 5_000;

    fn output_command(state: State) -> Command {
        Command::OutputAll(state)
    }
}
