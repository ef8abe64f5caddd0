// libese/libese/src/transport/traits.rs

//! Transport trait.

use crate::Result;

/// Half-duplex byte link to the secure element.
///
/// `receive` blocks until one complete frame has arrived or `timeout_ms`
/// elapses, in which case it returns [`crate::Error::TransportTimeout`].
/// Locating the start of a frame on the wire is the transport's job; the
/// returned bytes begin with the NAD.
pub trait Transport: Send {
    /// Write one encoded frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Read one frame, waiting at most `timeout_ms` milliseconds.
    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Transport-level reset, called once when a session is opened.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        (**self).receive(timeout_ms)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}
