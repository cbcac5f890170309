use core::{fmt::Write as _, marker::PhantomData};

use embedded_io::Error as _;
use tracing::{debug, instrument, trace, warn};

use crate::{
    command::{Command, Reply},
    error::{Error, Result},
    model::{Ka3305p, Kd3305p, Model},
    reply,
    status::Status,
    types::{Channel, Panel, State, TrackingMode},
};

/// A KA3305P PSU.
pub type Ka3305pPsu<S, const L: usize = 64> = Psu<S, Ka3305p, L>;
/// A KD3305P PSU.
pub type Kd3305pPsu<S, const L: usize = 64> = Psu<S, Kd3305p, L>;

/// You can create a Psu using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// For it's methods, we generally use the nomenclature that "set" meant to write a configuration and "get" means to read
/// back a configuration value. Where as "read" means to get a measured value.
///
/// `L` is the size of the command and reply buffers.
///
/// All arguments are checked before anything is sent. An out of range value or unknown channel never reaches the PSU.
/// The PSU needs [`Model::SETTLE_TIME`] to apply a new setting, waiting for it between commands is up to the caller.
///
/// A query costs two read timeouts of the interface on top of the reply itself: one making sure the line is quiet
/// before sending, one making sure nothing follows the reply.
pub struct Psu<S: embedded_io::Read + embedded_io::Write, M: Model, const L: usize = 64> {
    interface: S,
    /// Status as of the last [`Self::status`] call.
    last_status: Option<Status>,
    _model: PhantomData<M>,
}

impl<S: embedded_io::Read + embedded_io::Write, M: Model, const L: usize> Psu<S, M, L> {
    /// Create a new Psu instance with the given interface. Nothing is sent to the PSU.
    pub fn new(interface: S) -> Self {
        Self {
            interface,
            last_status: None,
            _model: PhantomData,
        }
    }

    /// Create a new Psu instance and make sure the PSU is answering by reading its status.
    #[instrument(level = "debug", skip_all, fields(model = M::NAME))]
    pub fn connect(interface: S) -> Result<Self, S::Error> {
        let mut psu = Self::new(interface);
        let status = psu.status()?;
        debug!(?status, "connected");
        Ok(psu)
    }

    /// Hand back the interface, ending communication with the PSU.
    pub fn release(self) -> S {
        self.interface
    }

    /// Return the identification string. E.g. `KORAD KD3305P V2.0`.
    pub fn identify(&mut self) -> Result<heapless::String<L>, S::Error> {
        let raw = self.transact(Command::Identify)?;
        let text = core::str::from_utf8(&raw).map_err(|_| Error::InvalidResponse)?;
        let mut identity = heapless::String::new();
        identity
            .push_str(reply::trim_text(text))
            .map_err(|_| Error::BufferError)?;
        Ok(identity)
    }

    /// Set the output target voltage of a channel. Value supplied in millivolts.
    ///
    /// The PSU has a 10mV resolution, the value is rounded to the nearest step.
    pub fn set_voltage_mv(&mut self, channel: u8, voltage_mv: u32) -> Result<(), S::Error> {
        let channel = Self::validate_channel(channel)?;
        Self::check_range(voltage_mv, M::MAX_VOLTAGE_MV)?;
        self.transact(Command::SetVoltage {
            channel,
            voltage_mv,
        })?;
        Ok(())
    }

    /// Get the output target voltage of a channel. Value returned in millivolts.
    pub fn get_voltage_mv(&mut self, channel: u8) -> Result<u32, S::Error> {
        let channel = Self::validate_channel(channel)?;
        self.query_milli(Command::GetVoltage(channel))
    }

    /// Return the measured output voltage of a channel in millivolts.
    pub fn read_voltage_mv(&mut self, channel: u8) -> Result<u32, S::Error> {
        let channel = Self::validate_channel(channel)?;
        self.query_milli(Command::ReadVoltage(channel))
    }

    /// Set the output current limit of a channel. Value supplied in milliamps.
    pub fn set_current_ma(&mut self, channel: u8, current_ma: u32) -> Result<(), S::Error> {
        let channel = Self::validate_channel(channel)?;
        Self::check_range(current_ma, M::MAX_CURRENT_MA)?;
        self.transact(Command::SetCurrent {
            channel,
            current_ma,
        })?;
        Ok(())
    }

    /// Get the output current limit of a channel. Value returned in milliamps.
    pub fn get_current_ma(&mut self, channel: u8) -> Result<u32, S::Error> {
        let channel = Self::validate_channel(channel)?;
        self.query_milli(Command::GetCurrent(channel))
    }

    /// Return the measured output current of a channel in milliamps.
    pub fn read_current_ma(&mut self, channel: u8) -> Result<u32, S::Error> {
        let channel = Self::validate_channel(channel)?;
        self.query_milli(Command::ReadCurrent(channel))
    }

    /// Enable/disable all outputs.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.transact(M::output_command(state.into()))?;
        Ok(())
    }

    /// Enable/disable over current protection.
    pub fn set_ocp_enabled(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.transact(Command::Ocp(state.into()))?;
        Ok(())
    }

    /// Set the over current protection level of a channel. Value supplied in milliamps.
    pub fn set_ocp_ma(&mut self, channel: u8, current_ma: u32) -> Result<(), S::Error> {
        let channel = Self::validate_channel(channel)?;
        Self::check_range(current_ma, M::MAX_CURRENT_MA)?;
        self.transact(Command::SetOcp {
            channel,
            current_ma,
        })?;
        Ok(())
    }

    /// Enable/disable over voltage protection.
    pub fn set_ovp_enabled(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.transact(Command::Ovp(state.into()))?;
        Ok(())
    }

    /// Set the over voltage protection level of a channel. Value supplied in millivolts.
    pub fn set_ovp_mv(&mut self, channel: u8, voltage_mv: u32) -> Result<(), S::Error> {
        let channel = Self::validate_channel(channel)?;
        Self::check_range(voltage_mv, M::MAX_VOLTAGE_MV)?;
        self.transact(Command::SetOvp {
            channel,
            voltage_mv,
        })?;
        Ok(())
    }

    /// Read the PSU status. (Regulation mode of each channel, tracking, output state...)
    pub fn status(&mut self) -> Result<Status, S::Error> {
        let raw = self.transact(Command::Status)?;
        let byte = raw.first().copied().ok_or(Error::NoResponse)?;
        let status = Status::from(byte);
        self.last_status = Some(status);
        Ok(status)
    }

    /// The status as of the last [`Self::status`] call, if there was one.
    pub fn cached_status(&self) -> Option<Status> {
        self.last_status
    }

    /// Load stored panel settings (`1` - `5`).
    pub fn recall_panel(&mut self, panel: u8) -> Result<(), S::Error> {
        let panel = Self::validate_panel(panel)?;
        self.transact(Command::Recall(panel))?;
        Ok(())
    }

    /// Store the current panel settings (`1` - `5`). Overwrites the slot.
    pub fn save_panel(&mut self, panel: u8) -> Result<(), S::Error> {
        let panel = Self::validate_panel(panel)?;
        self.transact(Command::Save(panel))?;
        Ok(())
    }

    /// Select independent, series or parallel operation.
    pub fn set_tracking_mode(&mut self, mode: TrackingMode) -> Result<(), S::Error> {
        self.transact(Command::Track(mode))?;
        Ok(())
    }

    fn validate_channel(channel: u8) -> Result<Channel, S::Error> {
        M::channel(channel).ok_or_else(|| {
            warn!(channel, model = M::NAME, "no such channel");
            Error::InvalidChannel(channel)
        })
    }

    fn validate_panel(panel: u8) -> Result<Panel, S::Error> {
        Panel::try_from(panel).map_err(|index| {
            warn!(panel = index, "no such panel");
            Error::InvalidPanel(index)
        })
    }

    fn check_range(value: u32, max: u32) -> Result<(), S::Error> {
        if value > max {
            warn!(value, max, "value out of range");
            return Err(Error::InvalidRange);
        }
        Ok(())
    }

    /// Send a query and parse the decimal reply into milli-units.
    fn query_milli(&mut self, command: Command) -> Result<u32, S::Error> {
        let raw = self.transact(command)?;
        core::str::from_utf8(&raw)
            .ok()
            .and_then(reply::parse_milli)
            .ok_or_else(|| {
                warn!(%command, reply = ?raw.as_slice(), "unparseable reply");
                Error::InvalidResponse
            })
    }

    /// Send a command and collect whatever reply it produces.
    ///
    /// Queries start from a quiet line, anything left over from earlier is thrown away first. A fixed length reply
    /// followed by more bytes is rejected rather than truncated.
    fn transact(&mut self, command: Command) -> Result<heapless::Vec<u8, L>, S::Error> {
        let reply = command.reply();
        if reply != Reply::None {
            let stale = self.drain()?;
            if stale > 0 {
                debug!(stale, "discarded stale input");
            }
        }
        self.send(command)?;
        match reply {
            Reply::None => Ok(heapless::Vec::new()),
            Reply::Fixed(len) => {
                let raw = self.receive(Some(len))?;
                if raw.len() == len {
                    let extra = self.drain()?;
                    if extra > 0 {
                        warn!(%command, extra, "reply longer than expected");
                        return Err(Error::InvalidResponse);
                    }
                }
                Ok(raw)
            }
            Reply::Text => self.receive(None),
        }
    }

    fn send(&mut self, command: Command) -> Result<(), S::Error> {
        let mut buff: heapless::String<L> = heapless::String::new();
        write!(buff, "{}", command).map_err(|_| Error::BufferError)?;
        debug!(command = buff.as_str(), "send");

        self.interface
            .write_all(buff.as_bytes())
            .map_err(Error::SerialError)?;
        self.interface.flush().map_err(Error::SerialError)
    }

    /// Read a reply of `expected` bytes, or until a newline if `None`.
    ///
    /// Stops early when the PSU goes quiet, as long as something was received.
    fn receive(&mut self, expected: Option<usize>) -> Result<heapless::Vec<u8, L>, S::Error> {
        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut temp_buf = [0u8; 8];
        loop {
            let want = match expected {
                Some(len) => (len - buff.len()).min(temp_buf.len()),
                None => temp_buf.len(),
            };
            match self.interface.read(&mut temp_buf[..want]) {
                // EOF, the other end is gone.
                Ok(0) if buff.is_empty() => {
                    warn!("port closed");
                    return Err(Error::Disconnected);
                }
                Ok(0) => break,
                Ok(bytes_read) => {
                    let chunk = &temp_buf[..bytes_read];
                    buff.extend_from_slice(chunk)
                        .map_err(|_| Error::BufferError)?;
                    if expected == Some(buff.len()) {
                        break;
                    }
                    if expected.is_none() && chunk.contains(&b'\n') {
                        break;
                    }
                }
                Err(e) if matches!(e.kind(), embedded_io::ErrorKind::TimedOut) => {
                    if buff.is_empty() {
                        warn!("no reply before timeout");
                        return Err(Error::Timeout);
                    }
                    break;
                }
                Err(e) => return Err(Error::SerialError(e)),
            }
        }

        trace!(reply = ?buff.as_slice(), "receive");
        Ok(buff)
    }

    /// Read and throw away input until the line goes quiet. Returns the number of bytes discarded.
    ///
    /// Gives up with [`Error::InvalidResponse`] once more than `L` bytes were discarded.
    fn drain(&mut self) -> Result<usize, S::Error> {
        let mut temp_buf = [0u8; 8];
        let mut discarded = 0;
        loop {
            match self.interface.read(&mut temp_buf) {
                Ok(0) => {
                    warn!("port closed");
                    return Err(Error::Disconnected);
                }
                Ok(bytes_read) => {
                    trace!(bytes = ?&temp_buf[..bytes_read], "discard");
                    discarded += bytes_read;
                    if discarded > L {
                        warn!(discarded, "line does not go quiet");
                        return Err(Error::InvalidResponse);
                    }
                }
                Err(e) if matches!(e.kind(), embedded_io::ErrorKind::TimedOut) => {
                    return Ok(discarded);
                }
                Err(e) => return Err(Error::SerialError(e)),
            }
        }
    }
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> Psu<S, Kd3305p, L> {
    /// Enable/disable the output of a single channel.
    pub fn set_channel_output(
        &mut self,
        channel: u8,
        state: impl Into<State>,
    ) -> Result<(), S::Error> {
        let channel = Self::validate_channel(channel)?;
        self.transact(Command::ChannelOutput {
            channel,
            state: state.into(),
        })?;
        Ok(())
    }

    /// Enable/disable the beeper.
    pub fn set_beep(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.transact(Command::Beep(state.into()))?;
        Ok(())
    }
}
