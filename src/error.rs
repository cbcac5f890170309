//! Our error types for the Korad PSUs.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for Korad PSU communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    SerialError(I),
    #[error("Communication timeout")]
    Timeout,
    #[error("Connection closed")]
    Disconnected,
    #[error("No response received")]
    NoResponse,
    #[error("Invalid response received")]
    InvalidResponse,
    #[error("Buffer too small for command or response")]
    BufferError,
    #[error("Channel {0} does not exist on this model")]
    InvalidChannel(u8),
    #[error("Panel {0} does not exist")]
    InvalidPanel(u8),
    #[error("Invalid range")]
    InvalidRange,
}

impl<I: embedded_io::Error> Error<I> {
    /// The link to the PSU failed. (Port gone, I/O error or no answer in time.)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::SerialError(_) | Error::Timeout | Error::Disconnected
        )
    }

    /// The PSU answered, but not with something we could make sense of.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::NoResponse | Error::InvalidResponse | Error::BufferError
        )
    }
}
