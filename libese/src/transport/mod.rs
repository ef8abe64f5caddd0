// libese/libese/src/transport/mod.rs

//! Byte transports carrying frames to and from the secure element.

pub mod mock;
pub mod stream;
pub mod traits;

pub use mock::{MockReply, MockTransport};
pub use stream::StreamTransport;
pub use traits::Transport;
