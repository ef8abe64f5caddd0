// libese/libese/src/engine/chaining.rs

//! Splitting a command into I-frames no larger than the IFSC.

use crate::engine::context::IFrameInfo;
use crate::types::SeqNo;

fn layout(offset: usize, total: usize, ifsc: usize, seq: SeqNo) -> IFrameInfo {
    let left = total.saturating_sub(offset);
    let send_len = left.min(ifsc);
    IFrameInfo {
        seq,
        chaining: left > ifsc,
        offset,
        send_len,
        remaining: left - send_len,
    }
}

/// First fragment of a `total`-byte command. Its sequence bit follows the
/// last I-frame sent.
pub fn first_fragment(total: usize, ifsc: usize, last_seq: SeqNo) -> IFrameInfo {
    layout(0, total, ifsc, last_seq.toggled())
}

/// Fragment after `prev` has been acknowledged.
pub fn next_fragment(prev: &IFrameInfo, ifsc: usize) -> IFrameInfo {
    let offset = prev.offset + prev.send_len;
    layout(offset, offset + prev.remaining, ifsc, prev.seq.toggled())
}

/// Number of I-frames a `total`-byte command needs.
pub fn fragment_count(total: usize, ifsc: usize) -> usize {
    if ifsc == 0 {
        return 0;
    }
    total.div_ceil(ifsc).max(1)
}
