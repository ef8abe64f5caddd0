// libese/libese/src/protocol/frame.rs

//! Frame type with wire encoding and decoding.

use crate::constants::{HEADER_LEN, LEN_OFFSET, LRC_LEN, MAX_INF_LEN, MIN_FRAME_LEN, NAD, PCB_OFFSET};
use crate::protocol::checksum::{lrc, verify_lrc};
use crate::protocol::parser::{byte_at, ensure_len, slice_at};
use crate::protocol::pcb;
use crate::types::{FrameKind, RErrorCode, SFrameType, SeqNo};
use crate::{Error, Result};

/// A decoded T=1 block.
///
/// Wire format: `[NAD] [PCB] [LEN] [INF(LEN)] [LRC]`. The LRC is not stored;
/// it is computed by [`Frame::encode`] and verified by [`Frame::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// I-block with one fragment of an APDU.
    Information {
        /// N(S).
        seq: SeqNo,
        /// More data follows in the next I-frame.
        chaining: bool,
        /// INF field.
        payload: Vec<u8>,
    },
    /// R-block acknowledging or rejecting an I-block.
    Receive {
        /// N(R): the sequence number expected next.
        seq: SeqNo,
        /// ACK or the error reported.
        error: RErrorCode,
    },
    /// S-block for link control.
    Supervisory {
        /// Request or response code.
        s_type: SFrameType,
        /// INF field, one byte for WTX and IFS.
        payload: Vec<u8>,
    },
}

impl Frame {
    /// Block type.
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Information { .. } => FrameKind::Information,
            Frame::Receive { .. } => FrameKind::Receive,
            Frame::Supervisory { .. } => FrameKind::Supervisory,
        }
    }

    /// PCB byte for this frame.
    pub fn pcb(&self) -> u8 {
        match self {
            Frame::Information { seq, chaining, .. } => pcb::i_pcb(*seq, *chaining),
            Frame::Receive { seq, error } => pcb::r_pcb(*seq, *error),
            Frame::Supervisory { s_type, .. } => pcb::s_pcb(*s_type),
        }
    }

    /// INF field; always empty for R-frames.
    pub fn payload(&self) -> &[u8] {
        match self {
            Frame::Information { payload, .. } | Frame::Supervisory { payload, .. } => payload,
            Frame::Receive { .. } => &[],
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_block(self.pcb(), self.payload())
    }

    /// Decode wire bytes. The LRC is checked before anything else is parsed.
    pub fn decode(bytes: &[u8]) -> Result<Frame> {
        ensure_len(bytes, MIN_FRAME_LEN)?;
        verify_lrc(bytes)?;

        let pcb_byte = byte_at(bytes, PCB_OFFSET)?;
        let len = byte_at(bytes, LEN_OFFSET)? as usize;
        let required = HEADER_LEN + len + LRC_LEN;
        if bytes.len() != required {
            return Err(Error::InvalidLength {
                expected: required,
                actual: bytes.len(),
            });
        }
        let inf = slice_at(bytes, HEADER_LEN, len)?;

        match pcb::frame_kind(pcb_byte) {
            FrameKind::Information => Ok(Frame::Information {
                seq: pcb::i_seq(pcb_byte),
                chaining: pcb::i_chaining(pcb_byte),
                payload: inf.to_vec(),
            }),
            FrameKind::Receive => {
                if !inf.is_empty() {
                    return Err(Error::MalformedFrame(format!(
                        "R-frame with {} INF bytes",
                        inf.len()
                    )));
                }
                Ok(Frame::Receive {
                    seq: pcb::r_seq(pcb_byte),
                    error: pcb::r_error(pcb_byte),
                })
            }
            FrameKind::Supervisory => Ok(Frame::Supervisory {
                s_type: pcb::s_type(pcb_byte)?,
                payload: inf.to_vec(),
            }),
        }
    }
}

/// Build `[NAD, pcb, len, inf.., lrc]` straight from a borrowed INF slice.
pub fn encode_block(pcb: u8, inf: &[u8]) -> Result<Vec<u8>> {
    if inf.len() > MAX_INF_LEN {
        return Err(Error::InvalidLength {
            expected: MAX_INF_LEN,
            actual: inf.len(),
        });
    }
    let mut out = Vec::with_capacity(HEADER_LEN + inf.len() + LRC_LEN);
    out.push(NAD);
    out.push(pcb);
    out.push(inf.len() as u8);
    out.extend_from_slice(inf);
    out.push(lrc(&out));
    Ok(out)
}
