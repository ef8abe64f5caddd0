// libese/libese/src/protocol/mod.rs

//! T=1 frame codec.

pub mod checksum;
pub mod frame;
pub mod parser;
pub mod pcb;

pub use checksum::lrc;
pub use frame::{Frame, encode_block};
