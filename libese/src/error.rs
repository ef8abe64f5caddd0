// libese/libese/src/error.rs

//! Error type shared by every layer of the crate.

use thiserror::Error;

use crate::types::RErrorCode;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A received frame's LRC does not match its contents.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// LRC computed over the received bytes.
        expected: u8,
        /// LRC byte carried by the frame.
        actual: u8,
    },

    /// A frame that cannot be parsed.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A length field or buffer size that does not match.
    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Length implied by the frame header or the caller.
        expected: usize,
        /// Length actually present.
        actual: usize,
    },

    /// An I-frame repeating the sequence number of the previous one.
    #[error("duplicate I-frame sequence number {seq}")]
    DuplicateSequence {
        /// The repeated N(S) bit.
        seq: u8,
    },

    /// The card answered with an R-frame reporting a parity error.
    #[error("peer reported a parity error")]
    ParityError,

    /// The card answered with an R-frame reporting another error.
    #[error("peer reported an error: {0}")]
    PeerError(RErrorCode),

    /// No frame arrived within the read timeout.
    #[error("transport timed out")]
    TransportTimeout,

    /// The transport failed for a reason other than a timeout.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// I/O error from the underlying device.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Retries and the interface-reset escalation are used up.
    #[error("recovery attempts exhausted")]
    RecoveryExhausted,

    /// The operation is not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A caller-supplied value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The secure element is held by another user or a firmware download.
    #[error("secure element is busy")]
    Busy,

    /// The power manager rejected a request.
    #[error("power manager error: {0}")]
    Power(String),
}

impl Error {
    /// True for faults the engine repairs on its own (retransmission,
    /// R-NACK, interface reset) without failing the exchange.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ChecksumMismatch { .. }
                | Error::MalformedFrame(_)
                | Error::InvalidLength { .. }
                | Error::DuplicateSequence { .. }
                | Error::ParityError
                | Error::PeerError(_)
                | Error::TransportTimeout
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
