//! Byte transports standing in for the adapter's serial line.

use std::io::{self, Read};
use std::time::Duration;

/// How long a poll waits for a byte before reporting idle
pub const POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Result of polling the inbound side once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Byte(u8),
    Idle,
    Closed,
}

/// Reads at most one byte per poll from a reader configured with a short
/// timeout.
pub struct PolledReader<R> {
    inner: R,
    /// TCP signals disconnect with a zero-length read; serial ports don't
    eof_closes: bool,
}

impl<R: Read> PolledReader<R> {
    pub fn new(inner: R, eof_closes: bool) -> Self {
        Self { inner, eof_closes }
    }

    pub fn poll(&mut self) -> io::Result<Inbound> {
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(0) if self.eof_closes => Ok(Inbound::Closed),
            Ok(0) => Ok(Inbound::Idle),
            Ok(_) => Ok(Inbound::Byte(byte[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Inbound::Idle)
            }
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => Ok(Inbound::Closed),
            Err(e) => Err(e),
        }
    }
}
