//! Small helpers shared by the codec, engine and transports.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
