//! Hex rendering for frame traces.

use std::fmt::Write;

/// Lowercase hex without separators: `&[0xde, 0xad]` -> `"dead"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Lowercase hex, one space between bytes: `&[0xde, 0xad]` -> `"de ad"`.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Direction marker used in frame dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to card.
    Tx,
    /// Card to host.
    Rx,
}

/// Render a wire frame as `"TX [4] 00 c0 00 c0"`.
pub fn frame_dump(direction: Direction, frame: &[u8]) -> String {
    let tag = match direction {
        Direction::Tx => "TX",
        Direction::Rx => "RX",
    };
    format!("{} [{}] {}", tag, frame.len(), bytes_to_hex_spaced(frame))
}
