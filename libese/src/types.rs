// libese/libese/src/types.rs

//! Protocol value types shared by the codec and the engine.

use crate::Error;
use derive_more::Display;

/// Single-bit T=1 sequence number, N(S) for I-frames and N(R) for R-frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeqNo(bool);

impl SeqNo {
    /// Sequence bit 0.
    pub const ZERO: Self = Self(false);
    /// Sequence bit 1; the state after open or reset.
    pub const ONE: Self = Self(true);

    /// Build from the least significant bit of `bit`.
    pub const fn from_bit(bit: u8) -> Self {
        Self(bit & 0x01 != 0)
    }

    /// The bit as 0 or 1.
    pub const fn bit(self) -> u8 {
        self.0 as u8
    }

    /// The other sequence number.
    #[must_use]
    pub const fn toggled(self) -> Self {
        Self(!self.0)
    }
}

impl std::fmt::Display for SeqNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Block type selected by the two high PCB bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FrameKind {
    /// Information block, carries APDU data.
    #[display(fmt = "I-frame")]
    Information,
    /// Receive-ready block, acknowledges or rejects.
    #[display(fmt = "R-frame")]
    Receive,
    /// Supervisory block.
    #[display(fmt = "S-frame")]
    Supervisory,
}

/// Error code carried in the low nibble of an R-frame PCB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum RErrorCode {
    /// Positive acknowledgement.
    #[default]
    #[display(fmt = "no error")]
    None,
    /// EDC or parity error.
    #[display(fmt = "parity error")]
    Parity,
    /// Other error, e.g. an unexpected sequence number.
    #[display(fmt = "other error")]
    Other,
    /// The start-of-frame byte was not seen.
    #[display(fmt = "SOF missed")]
    SofMissed,
    /// Any RFU bit set.
    #[display(fmt = "undefined error")]
    Undefined,
}

impl RErrorCode {
    const RFU_MASK: u8 = 0x0C;
    const CODE_MASK: u8 = 0x03;

    /// Classify the low nibble of an R-frame PCB.
    pub const fn from_pcb(pcb: u8) -> Self {
        if pcb & Self::RFU_MASK != 0 {
            return Self::Undefined;
        }
        let lsb = pcb & 0x01;
        let bit2 = (pcb >> 1) & 0x01;
        match (lsb, bit2) {
            (0, 0) => Self::None,
            (1, 0) => Self::Parity,
            (0, 1) => Self::Other,
            _ => Self::SofMissed,
        }
    }

    /// Low-nibble bits for encoding.
    pub const fn bits(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Parity => 0x01,
            Self::Other => 0x02,
            Self::SofMissed => 0x03,
            Self::Undefined => Self::RFU_MASK,
        }
    }

    /// True for a positive acknowledgement.
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::None)
    }
}

/// S-frame subtype, encoded in the low six PCB bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SFrameType {
    /// Resynchronise both sides' sequence numbers.
    #[display(fmt = "RESYNCH_REQ")]
    ResynchReq,
    /// Answer to `ResynchReq`.
    #[display(fmt = "RESYNCH_RES")]
    ResynchRes,
    /// Change the information field size; INF holds the new size.
    #[display(fmt = "IFS_REQ")]
    IfsReq,
    /// Answer to `IfsReq`, echoing the size.
    #[display(fmt = "IFS_RES")]
    IfsRes,
    /// Abort a chain.
    #[display(fmt = "ABORT_REQ")]
    AbortReq,
    /// Answer to `AbortReq`.
    #[display(fmt = "ABORT_RES")]
    AbortRes,
    /// Card asks for more time; INF holds the multiplier.
    #[display(fmt = "WTX_REQ")]
    WtxReq,
    /// Grants the extension, echoing the multiplier.
    #[display(fmt = "WTX_RES")]
    WtxRes,
    /// Reset the card's protocol layer.
    #[display(fmt = "INTF_RESET_REQ")]
    IntfResetReq,
    /// Answer to `IntfResetReq`.
    #[display(fmt = "INTF_RESET_RES")]
    IntfResetRes,
    /// End of the APDU session.
    #[display(fmt = "END_OF_SESSION_REQ")]
    EndOfSessionReq,
    /// Answer to `EndOfSessionReq`.
    #[display(fmt = "END_OF_SESSION_RES")]
    EndOfSessionRes,
}

impl SFrameType {
    /// Set on every response code.
    pub const RESPONSE_FLAG: u8 = 0x20;

    /// Six-bit code as carried in the PCB.
    pub const fn code(self) -> u8 {
        match self {
            Self::ResynchReq => 0x00,
            Self::IfsReq => 0x01,
            Self::AbortReq => 0x02,
            Self::WtxReq => 0x03,
            Self::IntfResetReq => 0x04,
            Self::EndOfSessionReq => 0x05,
            Self::ResynchRes => 0x20,
            Self::IfsRes => 0x21,
            Self::AbortRes => 0x22,
            Self::WtxRes => 0x23,
            Self::IntfResetRes => 0x24,
            Self::EndOfSessionRes => 0x25,
        }
    }

    /// True for request codes (response flag clear).
    pub const fn is_request(self) -> bool {
        self.code() & Self::RESPONSE_FLAG == 0
    }

    /// Response matching a request; `None` when `self` already is one.
    pub fn response(self) -> Option<Self> {
        if self.is_request() {
            Self::try_from(self.code() | Self::RESPONSE_FLAG).ok()
        } else {
            None
        }
    }
}

impl TryFrom<u8> for SFrameType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0x00 => Self::ResynchReq,
            0x01 => Self::IfsReq,
            0x02 => Self::AbortReq,
            0x03 => Self::WtxReq,
            0x04 => Self::IntfResetReq,
            0x05 => Self::EndOfSessionReq,
            0x20 => Self::ResynchRes,
            0x21 => Self::IfsRes,
            0x22 => Self::AbortRes,
            0x23 => Self::WtxRes,
            0x24 => Self::IntfResetRes,
            0x25 => Self::EndOfSessionRes,
            other => {
                return Err(Error::MalformedFrame(format!(
                    "unknown S-frame type {:#04x}",
                    other
                )));
            }
        })
    }
}

/// How a session is brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum OpenMode {
    /// Interface reset handshake.
    #[default]
    #[display(fmt = "normal")]
    Normal,
    /// Resynchronisation only, used while the applet OS is being updated.
    #[display(fmt = "update")]
    Update,
}

/// Caller-visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionState {
    /// No exchange running.
    #[display(fmt = "idle")]
    Idle,
    /// An exchange holds the session.
    #[display(fmt = "transceiving")]
    Transceiving,
}
