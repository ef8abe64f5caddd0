//! Test support helpers intended for use by unit and integration tests.
//!
//! They centralise MockTransport setup and frame construction so tests
//! across the crate and the tests/ directory share the same fixtures.
#![allow(dead_code)]

use crate::config::EngineConfig;
use crate::power::MockPowerManager;
use crate::protocol::Frame;
use crate::session::{Closed, Opened, Session, SessionBuilder};
use crate::transport::MockTransport;
use crate::types::{OpenMode, RErrorCode, SFrameType, SeqNo};
use crate::Result;

/// Default configuration without settle delays.
#[doc(hidden)]
pub fn quiet_config() -> EngineConfig {
    EngineConfig::default().with_recovery_delay_us(0)
}

/// I-frame with N(S) = `seq`.
#[doc(hidden)]
pub fn i_frame(seq: u8, chaining: bool, payload: &[u8]) -> Frame {
    Frame::Information {
        seq: SeqNo::from_bit(seq),
        chaining,
        payload: payload.to_vec(),
    }
}

/// R-frame with N(R) = `seq`.
#[doc(hidden)]
pub fn r_frame(seq: u8, error: RErrorCode) -> Frame {
    Frame::Receive {
        seq: SeqNo::from_bit(seq),
        error,
    }
}

/// S-frame of `s_type` carrying `payload`.
#[doc(hidden)]
pub fn s_frame(s_type: SFrameType, payload: &[u8]) -> Frame {
    Frame::Supervisory {
        s_type,
        payload: payload.to_vec(),
    }
}

/// Closed session over clones of `mock` and `power`.
#[doc(hidden)]
pub fn mock_session(
    mock: &MockTransport,
    power: &MockPowerManager,
    config: EngineConfig,
) -> Result<Session<Closed>> {
    SessionBuilder::new()
        .with_transport(Box::new(mock.clone()))
        .with_power_manager(Box::new(power.clone()))
        .with_config(config)
        .build()
}

/// Seed the handshake response for `mode`, open, and clear the sent log so
/// tests only see frames of the exchanges under test.
#[doc(hidden)]
pub fn opened_mock_session(
    mock: &MockTransport,
    config: EngineConfig,
    mode: OpenMode,
) -> Result<Session<Opened>> {
    let answer = match mode {
        OpenMode::Normal if config.interface_reset_on_open => SFrameType::IntfResetRes,
        _ => SFrameType::ResynchRes,
    };
    mock.push_frame(&s_frame(answer, &[]))?;
    let session = mock_session(mock, &MockPowerManager::new(), config)?.open(mode)?;
    mock.clear_sent();
    Ok(session)
}
