// libese/libese/src/engine/context.rs

//! Bookkeeping for the frame being sent and the last one received.

use derive_more::Display;

use crate::protocol::{encode_block, pcb};
use crate::types::{FrameKind, RErrorCode, SFrameType, SeqNo};
use crate::{Error, Result};

/// What the state machine transmits next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NextAction {
    /// Next fragment of the command.
    #[display(fmt = "SEND_IFRAME")]
    SendIFrame,
    /// Acknowledge a chained I-frame from the card.
    #[display(fmt = "SEND_R_ACK")]
    SendRAck,
    /// Reject the last frame received.
    #[display(fmt = "SEND_R_NACK")]
    SendRNack,
    /// RESYNCH request.
    #[display(fmt = "SEND_S_RESYNCH")]
    SendSResynch,
    /// Interface reset request.
    #[display(fmt = "SEND_S_INTF_RESET")]
    SendSIntfReset,
    /// End-of-session request.
    #[display(fmt = "SEND_S_END_OF_SESSION")]
    SendSEndOfSession,
    /// Grant a waiting-time extension.
    #[display(fmt = "SEND_S_WTX_RESPONSE")]
    SendSWtxResponse,
    /// Confirm a new IFS.
    #[display(fmt = "SEND_S_IFS_RESPONSE")]
    SendSIfsResponse,
    /// Nothing left to send; the exchange is over.
    #[display(fmt = "IDLE")]
    Idle,
}

/// Position of one outbound I-frame inside the caller's command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IFrameInfo {
    /// N(S).
    pub seq: SeqNo,
    /// More fragments follow.
    pub chaining: bool,
    /// Start of this fragment within the command.
    pub offset: usize,
    /// INF length of this fragment.
    pub send_len: usize,
    /// Command bytes still to go after this fragment.
    pub remaining: usize,
}

impl Default for IFrameInfo {
    fn default() -> Self {
        Self {
            seq: SeqNo::ONE,
            chaining: false,
            offset: 0,
            send_len: 0,
            remaining: 0,
        }
    }
}

/// Outbound R-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RFrameInfo {
    /// N(R).
    pub seq: SeqNo,
    /// ACK or the error to report.
    pub error: RErrorCode,
}

/// Outbound S-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SFrameInfo {
    /// Request or response code.
    pub s_type: SFrameType,
    /// Single INF byte, present for WTX and IFS frames.
    pub inf: Option<u8>,
}

impl Default for SFrameInfo {
    fn default() -> Self {
        Self {
            s_type: SFrameType::ResynchReq,
            inf: None,
        }
    }
}

/// One outbound frame, described without copying payload bytes.
///
/// The I-frame part survives while R- and S-frames are in flight, so the
/// sequence bit of the most recent I-frame is always at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxContext {
    /// Kind of frame, `None` before the first send.
    pub kind: Option<FrameKind>,
    /// Most recent I-frame fragment.
    pub iframe: IFrameInfo,
    /// R-frame fields, valid when `kind` is an R-frame.
    pub rframe: RFrameInfo,
    /// S-frame fields, valid when `kind` is an S-frame.
    pub sframe: SFrameInfo,
}

impl TxContext {
    /// Transmit state for this frame.
    pub fn action(&self) -> NextAction {
        match self.kind {
            None => NextAction::Idle,
            Some(FrameKind::Information) => NextAction::SendIFrame,
            Some(FrameKind::Receive) if self.rframe.error.is_ack() => NextAction::SendRAck,
            Some(FrameKind::Receive) => NextAction::SendRNack,
            Some(FrameKind::Supervisory) => match self.sframe.s_type {
                SFrameType::ResynchReq => NextAction::SendSResynch,
                SFrameType::IntfResetReq => NextAction::SendSIntfReset,
                SFrameType::EndOfSessionReq => NextAction::SendSEndOfSession,
                SFrameType::WtxRes => NextAction::SendSWtxResponse,
                SFrameType::IfsRes => NextAction::SendSIfsResponse,
                // Not produced by the engine; resent verbatim if ever scheduled.
                _ => NextAction::SendSResynch,
            },
        }
    }

    /// True when this is an S-frame of `s_type`.
    pub fn is_supervisory(&self, s_type: SFrameType) -> bool {
        self.kind == Some(FrameKind::Supervisory) && self.sframe.s_type == s_type
    }

    /// Any S-frame other than a WTX response. A WTX request answered to
    /// one of these retries it instead of extending the wait.
    pub fn is_retried_on_wtx(&self) -> bool {
        self.kind == Some(FrameKind::Supervisory) && self.sframe.s_type != SFrameType::WtxRes
    }

    /// Wire bytes for this frame; I-frame INF is sliced from `command`.
    pub fn encode(&self, command: &[u8]) -> Result<Vec<u8>> {
        match self.kind {
            None => Err(Error::InvalidState("no frame scheduled".into())),
            Some(FrameKind::Information) => {
                let info = &self.iframe;
                let inf = command
                    .get(info.offset..info.offset + info.send_len)
                    .ok_or_else(|| {
                        Error::InvalidState(format!(
                            "fragment {}+{} outside {}-byte command",
                            info.offset,
                            info.send_len,
                            command.len()
                        ))
                    })?;
                encode_block(pcb::i_pcb(info.seq, info.chaining), inf)
            }
            Some(FrameKind::Receive) => {
                encode_block(pcb::r_pcb(self.rframe.seq, self.rframe.error), &[])
            }
            Some(FrameKind::Supervisory) => {
                let pcb = pcb::s_pcb(self.sframe.s_type);
                match self.sframe.inf {
                    Some(b) => encode_block(pcb, &[b]),
                    None => encode_block(pcb, &[]),
                }
            }
        }
    }
}

/// What was last received from the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxContext {
    /// Kind of the last valid frame.
    pub kind: Option<FrameKind>,
    /// N(S) of the last accepted I-frame.
    pub iframe_seq: SeqNo,
    /// Last R-frame received.
    pub rframe: Option<RFrameInfo>,
    /// Last S-frame code received, or the escalation request being sent.
    pub s_type: Option<SFrameType>,
}

impl Default for RxContext {
    fn default() -> Self {
        Self {
            kind: None,
            iframe_seq: SeqNo::ONE,
            rframe: None,
            s_type: None,
        }
    }
}
