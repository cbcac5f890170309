//! Host serial port support, enabled with the `serial` feature.
//!
//! [`open`] opens a port with the line settings the PSU expects and wraps it in [`Port`], which implements
//! [embedded_io::Read] & [embedded_io::Write] so it can be handed straight to [`Psu`](crate::psu::Psu).

use std::{io, time::Duration};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

/// Line settings used when opening the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSettings {
    pub baud_rate: u32,
    /// How long a read waits for the PSU before giving up. Also how long a free text reply may pause before it is
    /// considered complete.
    pub timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: crate::BAUD_RATE,
            // The PSU can take a while to respond, a reasonably large time out is required.
            timeout: Duration::from_millis(300),
        }
    }
}

/// Open the serial port at `path` (e.g. `/dev/ttyACM0` or `COM3`) for talking to the PSU. 8N1, no flow control.
pub fn open(path: &str, settings: &PortSettings) -> Result<Port, serialport::Error> {
    debug!(path, baud_rate = settings.baud_rate, "opening serial port");
    let port = serialport::new(path, settings.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(settings.timeout)
        .open()?;
    Ok(Port(port))
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>, serialport::Error> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect())
}

/// An open host serial port. The port is closed when this is dropped.
pub struct Port(Box<dyn SerialPort>);

impl Port {
    /// Name of the underlying port, if known.
    pub fn name(&self) -> Option<String> {
        self.0.name()
    }
}

/// [std::io::Error] wrapped so it can be used as an [embedded_io::Error].
#[derive(Debug)]
pub struct PortError(pub io::Error);

impl core::fmt::Display for PortError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for PortError {
    fn kind(&self) -> embedded_io::ErrorKind {
        io_kind(self.0.kind())
    }
}

fn io_kind(kind: io::ErrorKind) -> embedded_io::ErrorKind {
    use embedded_io::ErrorKind as E;
    match kind {
        io::ErrorKind::NotFound => E::NotFound,
        io::ErrorKind::PermissionDenied => E::PermissionDenied,
        io::ErrorKind::NotConnected => E::NotConnected,
        io::ErrorKind::BrokenPipe => E::BrokenPipe,
        io::ErrorKind::InvalidInput => E::InvalidInput,
        io::ErrorKind::InvalidData => E::InvalidData,
        // A serial read with nothing to read within the timeout.
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => E::TimedOut,
        io::ErrorKind::Interrupted => E::Interrupted,
        io::ErrorKind::Unsupported => E::Unsupported,
        io::ErrorKind::OutOfMemory => E::OutOfMemory,
        _ => E::Other,
    }
}

impl embedded_io::ErrorType for Port {
    type Error = PortError;
}

impl embedded_io::Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        io::Read::read(&mut self.0, buf).map_err(PortError)
    }
}

impl embedded_io::Write for Port {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        io::Write::write(&mut self.0, buf).map_err(PortError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        io::Write::flush(&mut self.0).map_err(PortError)
    }
}
