// libese/libese/src/transport/mock.rs

//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::protocol::Frame;
use crate::transport::traits::Transport;
use crate::{Error, Result};

/// One scripted answer to a `receive` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Deliver these bytes.
    Bytes(Vec<u8>),
    /// Time out.
    Timeout,
    /// Fail with `TransportFailure`.
    Failure(String),
}

#[derive(Debug, Default)]
struct MockState {
    sent: Vec<Vec<u8>>,
    replies: VecDeque<MockReply>,
    repeat: Option<MockReply>,
    fail_sends: bool,
    resets: usize,
}

/// Scripted transport for tests. Records every frame sent and answers
/// `receive` from a queue; an empty queue times out unless a repeating
/// reply is configured.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Mock with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue raw bytes, valid or not.
    pub fn push_response(&self, bytes: Vec<u8>) {
        self.lock().replies.push_back(MockReply::Bytes(bytes));
    }

    /// Queue an encoded frame.
    pub fn push_frame(&self, frame: &Frame) -> Result<()> {
        self.push_response(frame.encode()?);
        Ok(())
    }

    /// Queue a timeout.
    pub fn push_timeout(&self) {
        self.lock().replies.push_back(MockReply::Timeout);
    }

    /// Queue a hard failure.
    pub fn push_failure(&self, reason: &str) {
        self.lock()
            .replies
            .push_back(MockReply::Failure(reason.to_string()));
    }

    /// Answer every `receive` with `reply` once the queue is drained.
    pub fn repeat(&self, reply: MockReply) {
        self.lock().repeat = Some(reply);
    }

    /// Make every subsequent `send` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.lock().fail_sends = fail;
    }

    /// Every frame sent so far, as raw bytes.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    /// Sent frames decoded; undecodable entries are skipped.
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.lock()
            .sent
            .iter()
            .filter_map(|raw| Frame::decode(raw).ok())
            .collect()
    }

    /// Number of frames sent.
    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Forget the frames sent so far.
    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    /// Replies still queued.
    pub fn pending_replies(&self) -> usize {
        self.lock().replies.len()
    }

    /// Number of `reset` calls.
    pub fn reset_count(&self) -> usize {
        self.lock().resets
    }
}

impl Transport for MockTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_sends {
            return Err(Error::TransportFailure("mock send failure".into()));
        }
        state.sent.push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        let mut state = self.lock();
        let reply = match state.replies.pop_front() {
            Some(reply) => reply,
            None => state.repeat.clone().unwrap_or(MockReply::Timeout),
        };
        match reply {
            MockReply::Bytes(bytes) => Ok(bytes),
            MockReply::Timeout => Err(Error::TransportTimeout),
            MockReply::Failure(reason) => Err(Error::TransportFailure(reason)),
        }
    }

    fn reset(&mut self) -> Result<()> {
        // Queued replies survive so tests can seed them before opening.
        self.lock().resets += 1;
        Ok(())
    }
}
