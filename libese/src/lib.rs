// libese/libese/src/lib.rs

//! libese
//!
//! ISO7816-3 T=1 block protocol engine for embedded secure elements reached
//! over SPI or another half-duplex byte transport.
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod power;
pub mod prelude;
pub mod protocol;
pub mod session;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the protocol newtypes are available without reaching into modules.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
