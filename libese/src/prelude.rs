// libese/libese/src/prelude.rs

//! Convenience re-exports for applications driving a session.

pub use crate::config::{ConfigSource, EngineConfig};
pub use crate::engine::{Engine, NextAction, RErrorPolicy, RecoveryAction};
pub use crate::power::{NoopPowerManager, PowerManager, PowerOp, PowerState};
pub use crate::protocol::Frame;
pub use crate::session::{Closed, Opened, Session, SessionBuilder};
pub use crate::transport::{MockTransport, StreamTransport, Transport};
pub use crate::{
    Error, FrameKind, OpenMode, RErrorCode, Result, SFrameType, SeqNo, SessionState,
};

pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms};
