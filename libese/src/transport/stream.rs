// libese/libese/src/transport/stream.rs

//! Transport over any blocking byte stream.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::constants::{HEADER_LEN, LRC_LEN, NAD, RECEIVE_SOF};
use crate::transport::traits::Transport;
use crate::utils::ms;
use crate::{Error, Result};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Transport over a byte stream such as an opened SPI character device.
///
/// The secure element answers with a `0xA5` start-of-frame byte where the
/// NAD would be. `receive` polls for it until the timeout, reads PCB and
/// LEN, then LEN + 1 further bytes, and hands back the frame with byte 0
/// rewritten to the NAD so the LRC covers the whole buffer.
pub struct StreamTransport<S> {
    stream: S,
    poll_interval: Duration,
}

impl<S: Read + Write + Send> StreamTransport<S> {
    /// Wrap an opened device.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Pause between reads that return no data.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The wrapped stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Read one byte; `Ok(None)` when the stream has nothing right now.
    fn poll_byte(&mut self) -> Result<Option<u8>> {
        let mut b = [0u8; 1];
        match self.stream.read(&mut b) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(b[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn wait_or_timeout(&self, deadline: Instant) -> Result<()> {
        if Instant::now() >= deadline {
            return Err(Error::TransportTimeout);
        }
        std::thread::sleep(self.poll_interval);
        Ok(())
    }

    fn read_fully(&mut self, buf: &mut [u8], deadline: Instant) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.poll_byte()? {
                Some(b) => {
                    buf[filled] = b;
                    filled += 1;
                }
                None => self.wait_or_timeout(deadline)?,
            }
        }
        Ok(())
    }
}

impl<S: Read + Write + Send> Transport for StreamTransport<S> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.stream.write_all(frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let deadline = Instant::now() + ms(timeout_ms);

        let mut skipped = 0usize;
        loop {
            match self.poll_byte()? {
                Some(RECEIVE_SOF) => break,
                Some(_) => skipped += 1,
                None => self.wait_or_timeout(deadline)?,
            }
        }
        if skipped > 0 {
            log::trace!("discarded {} bytes before start of frame", skipped);
        }

        let mut header = [0u8; HEADER_LEN - 1];
        self.read_fully(&mut header, deadline)?;
        let len = header[1] as usize;

        let mut frame = Vec::with_capacity(HEADER_LEN + len + LRC_LEN);
        frame.push(NAD);
        frame.extend_from_slice(&header);
        frame.resize(HEADER_LEN + len + LRC_LEN, 0);
        self.read_fully(&mut frame[HEADER_LEN..], deadline)?;
        Ok(frame)
    }
}
