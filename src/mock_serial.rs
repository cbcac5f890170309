//! We use this mocking module in unit tests to emulate the PSU's serial port.

/// Our mock type used to emulate a serial port.
///
/// Everything written is recorded. Queued replies become readable one at a time, each after a query (a write
/// containing `?`) has been sent, the way the PSU only talks when asked. Reads hand out the readable bytes and then
/// time out, like a real port opened with a read timeout does once the PSU has stopped talking.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, 256>,
    /// Bytes waiting on the line, ready to be read
    read_buffer: heapless::Vec<u8, 256>,
    /// Replies to upcoming queries, in order
    replies: heapless::Deque<heapless::Vec<u8, 64>, 8>,
    /// Current position in the read buffer
    read_position: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Flag to simulate the USB cable being pulled
    disconnected: bool,
    /// Flag to simulate the other end closing, reads return `Ok(0)`
    closed: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// No data within the read timeout
    Timeout,
    /// Simulated buffer overflow
    BufferOverflow,
    /// Generic simulated error for testing
    SimulatedError,
    /// The port went away
    Disconnected,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::Timeout => write!(f, "read timed out"),
            MockSerialError::BufferOverflow => write!(f, "mock buffer overflow"),
            MockSerialError::SimulatedError => write!(f, "simulated error"),
            MockSerialError::Disconnected => write!(f, "port disconnected"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
            MockSerialError::Disconnected => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.disconnected {
            return Err(MockSerialError::Disconnected);
        }
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        if buf.contains(&b'?') {
            if let Some(reply) = self.replies.pop_front() {
                self.read_buffer
                    .extend_from_slice(&reply)
                    .map_err(|_| MockSerialError::BufferOverflow)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.disconnected {
            return Err(MockSerialError::Disconnected);
        }
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.disconnected {
            return Err(MockSerialError::Disconnected);
        }
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }
        if self.closed {
            return Ok(0);
        }

        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::Timeout);
        }

        let available = &self.read_buffer[self.read_position..];
        let bytes_to_read = core::cmp::min(buf.len(), available.len());
        buf[..bytes_to_read].copy_from_slice(&available[..bytes_to_read]);

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            replies: heapless::Deque::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
            disconnected: false,
            closed: false,
        }
    }

    /// Create a MockSerial which will answer the first query with `data`.
    pub fn with_reply(data: &[u8]) -> Self {
        Self::with_replies(&[data])
    }

    /// Create a MockSerial which will answer successive queries with `replies`.
    pub fn with_replies(replies: &[&[u8]]) -> Self {
        let mut mock = Self::new();
        for reply in replies {
            mock.queue_reply(reply).unwrap();
        }
        mock
    }

    /// Queue the answer to a future query. An empty reply means the PSU stays silent.
    pub fn queue_reply(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        let reply =
            heapless::Vec::from_slice(data).map_err(|_| MockSerialError::BufferOverflow)?;
        self.replies
            .push_back(reply)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Number of queued replies no query has asked for yet.
    pub fn queued_replies(&self) -> usize {
        self.replies.len()
    }

    /// Put `data` on the line right away, without waiting for a query. Replaces anything unread.
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Number of bytes on the line not yet read.
    pub fn unread(&self) -> usize {
        self.read_buffer.len() - self.read_position
    }

    /// Clear the write buffer
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Make every following operation fail as if the port was unplugged.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Make reads report end of file, as a port whose other end has closed does.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_multiple_times() {
        let mut mock = MockSerial::new();
        mock.write_all(b"VSET1:").unwrap();
        mock.write_all(b"12.00").unwrap();
        assert_eq!(mock.written_data(), b"VSET1:12.00");

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockSerial::new();
        let large_data = [0u8; 300];

        let result = mock.write(&large_data);
        assert!(matches!(result, Err(MockSerialError::BufferOverflow)));
    }

    #[test]
    fn test_read_partial_then_timeout() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"12.34").unwrap();

        let mut buffer = [0u8; 3];
        assert_eq!(mock.read(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer, b"12.");
        assert_eq!(mock.unread(), 2);
        assert_eq!(mock.read(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"34");

        let result = mock.read(&mut buffer);
        assert!(matches!(result, Err(MockSerialError::Timeout)));
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"data").unwrap();
        mock.set_write_error(true);
        assert!(matches!(
            mock.write(b"test"),
            Err(MockSerialError::SimulatedError)
        ));
        assert!(mock.flush().is_err());
        assert!(mock.written_data().is_empty());

        mock.set_read_error(true);
        let mut buffer = [0u8; 10];
        assert!(mock.read(&mut buffer).is_err());

        mock.set_write_error(false);
        mock.set_read_error(false);
        assert!(mock.write(b"test").is_ok());
        assert!(mock.read(&mut buffer).is_ok());
    }

    #[test]
    fn test_reply_waits_for_query() {
        let mut mock = MockSerial::with_replies(&[b"12.00", b"0.500"]);
        let mut buffer = [0u8; 8];
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::Timeout)
        ));

        // Setting commands are not answered.
        mock.write_all(b"VSET1:12.00").unwrap();
        assert_eq!(mock.unread(), 0);
        assert_eq!(mock.queued_replies(), 2);

        mock.write_all(b"VSET1?").unwrap();
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer[..5], b"12.00");
        assert_eq!(mock.queued_replies(), 1);

        mock.write_all(b"ISET1?").unwrap();
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer[..5], b"0.500");
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::Timeout)
        ));
    }

    #[test]
    fn test_closed_reads_eof() {
        let mut mock = MockSerial::new();
        mock.close();
        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_disconnect() {
        let mut mock = MockSerial::with_reply(b"data");
        mock.disconnect();
        let mut buffer = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::Disconnected)
        ));
        assert!(matches!(
            mock.write(b"OUT1"),
            Err(MockSerialError::Disconnected)
        ));
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockSerialError::Timeout.kind(),
            embedded_io::ErrorKind::TimedOut
        ));
        assert!(matches!(
            MockSerialError::BufferOverflow.kind(),
            embedded_io::ErrorKind::OutOfMemory
        ));
        assert!(matches!(
            MockSerialError::Disconnected.kind(),
            embedded_io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn test_error_display() {
        use core::fmt::Write as _;

        let mut text: heapless::String<32> = heapless::String::new();
        write!(text, "{}", MockSerialError::Timeout).unwrap();
        assert_eq!(text, "read timed out");

        let err: &dyn core::error::Error = &MockSerialError::Disconnected;
        assert!(err.source().is_none());
    }
}
