// Shared fixtures for the integration test crates.
#![allow(dead_code)]

use libese::protocol::Frame;
use libese::transport::MockTransport;

/// Route log output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decode a hex fixture such as `"00 c4 00 c4"`.
pub fn hex_bytes(s: &str) -> Vec<u8> {
    let compact: String = s.split_whitespace().collect();
    hex::decode(compact).expect("valid hex fixture")
}

/// Concatenate the INF fields of every I-frame the host sent, i.e. the
/// command as the card reassembles it.
pub fn peer_view(mock: &MockTransport) -> Vec<u8> {
    mock.sent_frames()
        .into_iter()
        .filter_map(|f| match f {
            Frame::Information { payload, .. } => Some(payload),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Sent I-frames as `(N(S), M, INF length)`.
pub fn sent_iframes(mock: &MockTransport) -> Vec<(u8, bool, usize)> {
    mock.sent_frames()
        .into_iter()
        .filter_map(|f| match f {
            Frame::Information {
                seq,
                chaining,
                payload,
            } => Some((seq.bit(), chaining, payload.len())),
            _ => None,
        })
        .collect()
}
