// libese/libese/src/protocol/pcb.rs

//! Protocol control byte layout.
//!
//! ```text
//! I-frame  0 N(S) M 0 0000
//! R-frame  1 0 0 N(R) eeee
//! S-frame  1 1 r ttttt      r = response flag
//! ```

use crate::types::{FrameKind, RErrorCode, SFrameType, SeqNo};
use crate::Result;

const KIND_SHIFT: u32 = 6;
const I_SEQ_SHIFT: u32 = 6;
const I_CHAINING_MASK: u8 = 0x20;
const R_BASE: u8 = 0x80;
const R_SEQ_SHIFT: u32 = 4;
const S_BASE: u8 = 0xC0;
const S_TYPE_MASK: u8 = 0x3F;

/// Block type from PCB bits 8 and 7.
pub const fn frame_kind(pcb: u8) -> FrameKind {
    match pcb >> KIND_SHIFT {
        0b00 | 0b01 => FrameKind::Information,
        0b10 => FrameKind::Receive,
        _ => FrameKind::Supervisory,
    }
}

/// N(S) of an I-frame PCB.
pub const fn i_seq(pcb: u8) -> SeqNo {
    SeqNo::from_bit(pcb >> I_SEQ_SHIFT)
}

/// More-data bit of an I-frame PCB.
pub const fn i_chaining(pcb: u8) -> bool {
    pcb & I_CHAINING_MASK != 0
}

/// N(R) of an R-frame PCB.
pub const fn r_seq(pcb: u8) -> SeqNo {
    SeqNo::from_bit(pcb >> R_SEQ_SHIFT)
}

/// Error code of an R-frame PCB.
pub const fn r_error(pcb: u8) -> RErrorCode {
    RErrorCode::from_pcb(pcb)
}

/// Subtype of an S-frame PCB; unknown codes are malformed.
pub fn s_type(pcb: u8) -> Result<SFrameType> {
    SFrameType::try_from(pcb & S_TYPE_MASK)
}

/// I-frame PCB.
pub const fn i_pcb(seq: SeqNo, chaining: bool) -> u8 {
    let m = if chaining { I_CHAINING_MASK } else { 0 };
    (seq.bit() << I_SEQ_SHIFT) | m
}

/// R-frame PCB.
pub const fn r_pcb(seq: SeqNo, error: RErrorCode) -> u8 {
    R_BASE | (seq.bit() << R_SEQ_SHIFT) | error.bits()
}

/// S-frame PCB.
pub const fn s_pcb(s_type: SFrameType) -> u8 {
    S_BASE | s_type.code()
}
