// libese/libese/src/engine/mod.rs

//! T=1 protocol state machine.
//!
//! One call to [`Engine::transceive`] (or to a control operation) runs a
//! complete exchange: transmit the scheduled frame, wait for the card's
//! answer, decide what to send next, until nothing is left to send.

pub mod chaining;
pub mod context;
pub mod reassembly;
pub mod recovery;
pub mod wtx;

use std::fmt::Display;

use log::{debug, error, trace, warn};

use crate::config::{EngineConfig, validate_frame_size};
use crate::protocol::Frame;
use crate::protocol::parser::single_inf_byte;
use crate::transport::Transport;
use crate::types::{FrameKind, RErrorCode, SFrameType, SeqNo};
use crate::utils::settle;
use crate::{Error, Result};

pub use context::{IFrameInfo, NextAction, RFrameInfo, RxContext, SFrameInfo, TxContext};
pub use reassembly::ReassemblyBuffer;
pub use recovery::{
    Escalation, RErrorPolicy, RecoveryAction, RecoveryCounters, default_r_error_policy,
};
pub use wtx::{WtxDecision, WtxGovernor};

/// How an exchange ended.
#[derive(Debug)]
enum Outcome {
    Pending,
    /// A complete response is in the reassembly buffer.
    Data,
    /// The card answered a control request.
    Control(SFrameType),
    Failed(Error),
}

/// Protocol engine for one secure-element session.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    ifsc: usize,
    next: TxContext,
    last: TxContext,
    rx: RxContext,
    action: NextAction,
    counters: RecoveryCounters,
    wtx: WtxGovernor,
    reassembly: ReassemblyBuffer,
    outcome: Outcome,
    r_error_policy: RErrorPolicy,
}

impl Engine {
    /// Engine with fresh protocol state and the IFSC from `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ifsc: config.max_frame_size as usize,
            wtx: WtxGovernor::new(config.wtx_counter_limit),
            config,
            next: TxContext::default(),
            last: TxContext::default(),
            rx: RxContext::default(),
            action: NextAction::Idle,
            counters: RecoveryCounters::default(),
            reassembly: ReassemblyBuffer::new(),
            outcome: Outcome::Pending,
            r_error_policy: default_r_error_policy,
        }
    }

    /// Replace the R-frame error policy.
    pub fn with_r_error_policy(mut self, policy: RErrorPolicy) -> Self {
        self.r_error_policy = policy;
        self
    }

    /// Parameters this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current IFSC.
    pub fn ifsc(&self) -> usize {
        self.ifsc
    }

    /// Set the IFSC, 1..=254.
    pub fn set_ifsc(&mut self, size: u16) -> Result<()> {
        validate_frame_size(size)?;
        debug!("IFSC {} -> {}", self.ifsc, size);
        self.ifsc = size as usize;
        Ok(())
    }

    /// What the state machine would transmit next; `Idle` between exchanges.
    pub fn next_action(&self) -> NextAction {
        self.action
    }

    /// Recovery counters of the current or last exchange.
    pub fn counters(&self) -> RecoveryCounters {
        self.counters
    }

    /// The frame most recently transmitted.
    pub fn last_sent(&self) -> &TxContext {
        &self.last
    }

    /// What was last received.
    pub fn rx_context(&self) -> &RxContext {
        &self.rx
    }

    /// Back to the post-open state: both sides' sequence bits at 1, no
    /// frame pending, counters cleared. The IFSC and WTX limit are kept.
    pub fn reset_params(&mut self) {
        self.next = TxContext::default();
        self.last = TxContext::default();
        self.rx = RxContext::default();
        self.action = NextAction::Idle;
        self.counters.reset();
        self.wtx.clear();
        trace!("protocol parameters reset");
    }

    /// Send `command` and return the card's complete response.
    pub fn transceive(&mut self, transport: &mut dyn Transport, command: &[u8]) -> Result<Vec<u8>> {
        if command.is_empty() {
            return Err(Error::InvalidArgument("empty command".into()));
        }
        self.begin();
        let first = chaining::first_fragment(command.len(), self.ifsc, self.last.iframe.seq);
        debug!(
            "transceive: {} bytes in {} fragment(s), IFSC {}",
            command.len(),
            chaining::fragment_count(command.len(), self.ifsc),
            self.ifsc
        );
        self.schedule_iframe(first);

        match self.run(transport, command) {
            Outcome::Data => {
                let response = self.reassembly.take();
                debug!("transceive: {} byte response", response.len());
                Ok(response)
            }
            Outcome::Failed(e) => Err(e),
            Outcome::Control(s_type) => {
                warn!("transceive ended with {} instead of a response", s_type);
                Err(Error::RecoveryExhausted)
            }
            Outcome::Pending => Err(Error::InvalidState("exchange ended without outcome".into())),
        }
    }

    /// INTF_RESET exchange. On success both sides restart their sequence
    /// numbers.
    pub fn interface_reset(&mut self, transport: &mut dyn Transport) -> Result<()> {
        self.control(transport, SFrameType::IntfResetReq)
    }

    /// Clear local parameters and run a RESYNCH exchange.
    pub fn resync(&mut self, transport: &mut dyn Transport) -> Result<()> {
        self.reset_params();
        self.control(transport, SFrameType::ResynchReq)
    }

    /// Tell the card the APDU session is over.
    pub fn end_of_session(&mut self, transport: &mut dyn Transport) -> Result<()> {
        self.control(transport, SFrameType::EndOfSessionReq)
    }

    fn control(&mut self, transport: &mut dyn Transport, request: SFrameType) -> Result<()> {
        self.begin();
        if request == SFrameType::IntfResetReq {
            // The request already is the escalation target.
            self.counters.escalated = true;
        }
        // A chain abandoned by a failed transceive has no command left to send.
        self.next.iframe.chaining = false;
        self.last.iframe.chaining = false;
        debug!("control exchange: {}", request);
        self.schedule_sframe(request, None);

        match self.run(transport, &[]) {
            Outcome::Control(s_type) => {
                debug!("{} answered with {}", request, s_type);
                Ok(())
            }
            Outcome::Failed(e) => Err(e),
            Outcome::Data => {
                self.reassembly.clear();
                warn!("{} answered with an I-frame", request);
                Err(Error::RecoveryExhausted)
            }
            Outcome::Pending => Err(Error::InvalidState("exchange ended without outcome".into())),
        }
    }

    fn begin(&mut self) {
        self.counters.reset();
        self.wtx.clear();
        self.reassembly.clear();
        self.outcome = Outcome::Pending;
    }

    fn run(&mut self, transport: &mut dyn Transport, command: &[u8]) -> Outcome {
        while self.action != NextAction::Idle {
            if let Err(e) = self.send_next(transport, command) {
                error!("send failed: {}", e);
                self.finish(Outcome::Failed(hard_failure(e)));
                break;
            }
            self.process_response(transport);
        }
        std::mem::replace(&mut self.outcome, Outcome::Pending)
    }

    fn send_next(&mut self, transport: &mut dyn Transport, command: &[u8]) -> Result<()> {
        let bytes = self.next.encode(command)?;
        trace!("{}", self.action);
        #[cfg(feature = "diagnostics")]
        trace!("{}", crate::utils::frame_dump(crate::utils::Direction::Tx, &bytes));
        transport.send(&bytes)?;
        self.last = self.next;
        Ok(())
    }

    fn process_response(&mut self, transport: &mut dyn Transport) {
        let raw = match transport.receive(self.config.read_timeout_ms) {
            Ok(raw) => raw,
            Err(Error::TransportTimeout) => return self.on_timeout(),
            Err(e) => {
                error!("receive failed: {}", e);
                return self.finish(Outcome::Failed(hard_failure(e)));
            }
        };
        self.counters.timeout_attempts = 0;
        #[cfg(feature = "diagnostics")]
        trace!("{}", crate::utils::frame_dump(crate::utils::Direction::Rx, &raw));

        match Frame::decode(&raw) {
            Ok(frame) => self.on_frame(frame),
            Err(fault) => self.on_corrupt_frame(fault),
        }
    }

    fn on_frame(&mut self, frame: Frame) {
        self.rx.kind = Some(frame.kind());
        if !matches!(
            frame,
            Frame::Supervisory {
                s_type: SFrameType::WtxReq,
                ..
            }
        ) {
            self.wtx.clear();
        }
        match frame {
            Frame::Information {
                seq,
                chaining,
                payload,
            } => self.on_iframe(seq, chaining, &payload),
            Frame::Receive { seq, error } => self.on_rframe(seq, error),
            Frame::Supervisory { s_type, payload } => self.on_sframe(s_type, &payload),
        }
    }

    fn on_iframe(&mut self, seq: SeqNo, chaining: bool, payload: &[u8]) {
        if seq == self.rx.iframe_seq {
            settle(self.config.recovery_delay());
            return self.retry_or_escalate(Error::DuplicateSequence { seq: seq.bit() }, |e| {
                e.schedule_rframe(RErrorCode::Other)
            });
        }
        self.counters.on_progress();
        self.rx.iframe_seq = seq;
        self.reassembly.append(payload);
        trace!(
            "I-frame N(S)={} M={} +{} bytes ({} total)",
            seq,
            chaining,
            payload.len(),
            self.reassembly.len()
        );
        if chaining {
            self.schedule_rframe(RErrorCode::None);
        } else {
            self.finish(Outcome::Data);
        }
    }

    fn on_rframe(&mut self, seq: SeqNo, error: RErrorCode) {
        self.rx.rframe = Some(RFrameInfo { seq, error });

        if error.is_ack() {
            // An S-frame exchange may sit between a fragment and its ACK.
            let acked_chained_fragment =
                seq != self.last.iframe.seq && self.last.iframe.chaining;
            if acked_chained_fragment {
                self.counters.on_progress();
                let next = chaining::next_fragment(&self.last.iframe, self.ifsc);
                trace!(
                    "fragment acknowledged, next at offset {} ({} bytes)",
                    next.offset,
                    next.send_len
                );
                self.schedule_iframe(next);
            } else {
                self.retry_or_escalate(
                    format_args!("R-ACK N(R)={} with nothing new to send", seq),
                    Self::resend_last,
                );
            }
            return;
        }

        settle(self.config.recovery_delay());
        let fault = match error {
            RErrorCode::Parity => Error::ParityError,
            other => Error::PeerError(other),
        };
        match (self.r_error_policy)(error) {
            RecoveryAction::Resend => self.retry_or_escalate(fault, Self::resend_last),
            RecoveryAction::Nack => {
                self.retry_or_escalate(fault, |e| e.schedule_rframe(RErrorCode::Other))
            }
            RecoveryAction::Escalate => self.escalate(fault),
        }
    }

    fn on_sframe(&mut self, s_type: SFrameType, inf: &[u8]) {
        self.rx.s_type = Some(s_type);
        match s_type {
            SFrameType::ResynchRes
            | SFrameType::IfsRes
            | SFrameType::AbortRes
            | SFrameType::EndOfSessionRes => {
                self.counters.on_progress();
                self.finish(Outcome::Control(s_type));
            }
            SFrameType::IntfResetRes => {
                self.reset_params();
                self.finish(Outcome::Control(s_type));
            }
            SFrameType::WtxReq => self.on_wtx_request(inf),
            SFrameType::IfsReq => match single_inf_byte(inf) {
                Some(size) if validate_frame_size(size as u16).is_ok() => {
                    self.counters.on_progress();
                    debug!("card requested IFSC {}", size);
                    self.ifsc = size as usize;
                    self.schedule_sframe(SFrameType::IfsRes, Some(size));
                }
                _ => self.retry_or_escalate(
                    Error::MalformedFrame("IFS request without a valid size".into()),
                    Self::resend_last,
                ),
            },
            other => self.retry_or_escalate(format_args!("unexpected {}", other), Self::resend_last),
        }
    }

    fn on_wtx_request(&mut self, inf: &[u8]) {
        if self.last.is_retried_on_wtx() {
            let pending = self.last.sframe.s_type;
            return self.retry_or_escalate(
                format_args!("WTX request after {}", pending),
                Self::resend_last,
            );
        }
        match self.wtx.on_request() {
            WtxDecision::Respond => {
                trace!("WTX {}/{}", self.wtx.count(), self.wtx.limit());
                self.schedule_sframe(SFrameType::WtxRes, single_inf_byte(inf));
            }
            WtxDecision::ForceReset => self.escalate(format_args!(
                "{} consecutive WTX requests",
                self.wtx.limit()
            )),
        }
    }

    fn on_corrupt_frame(&mut self, fault: Error) {
        if self.last_sent_was_response() {
            warn!("{} after {}; sending R-NACK", fault, self.last.sframe.s_type);
            return self.schedule_rframe(RErrorCode::Parity);
        }
        self.retry_or_escalate(fault, Self::resend_last);
    }

    fn on_timeout(&mut self) {
        if self.last_sent_was_response() {
            warn!("timeout after {}; sending R-NACK", self.last.sframe.s_type);
            return self.schedule_rframe(RErrorCode::Other);
        }
        settle(self.config.recovery_delay());
        if self.counters.try_timeout_retry(self.config.timeout_retry_limit) {
            warn!(
                "{}; retransmitting ({}/{})",
                Error::TransportTimeout,
                self.counters.timeout_attempts,
                self.config.timeout_retry_limit
            );
            self.resend_last();
        } else {
            error!("{}; giving up", Error::TransportTimeout);
            self.counters.timeout_attempts = 0;
            self.finish(Outcome::Failed(Error::RecoveryExhausted));
        }
    }

    fn retry_or_escalate(&mut self, reason: impl Display, retry: impl FnOnce(&mut Self)) {
        let limit = self.config.frame_retry_limit;
        if self.counters.try_frame_retry(limit) {
            warn!(
                "{}; recovery attempt {}/{}",
                reason, self.counters.recovery_attempts, limit
            );
            retry(self);
        } else {
            self.escalate(reason);
        }
    }

    fn escalate(&mut self, reason: impl Display) {
        match self.counters.escalate() {
            Escalation::InterfaceReset => {
                warn!("{}; escalating to interface reset", reason);
                self.rx.s_type = Some(SFrameType::IntfResetReq);
                self.schedule_sframe(SFrameType::IntfResetReq, None);
            }
            Escalation::Exhausted => {
                error!("{}; recovery exhausted", reason);
                self.finish(Outcome::Failed(Error::RecoveryExhausted));
            }
        }
    }

    /// WTX and RESYNCH responses are answered with R-NACK, not resent.
    fn last_sent_was_response(&self) -> bool {
        self.last.is_supervisory(SFrameType::WtxRes) || self.last.is_supervisory(SFrameType::ResynchRes)
    }

    fn resend_last(&mut self) {
        self.next = self.last;
        self.action = self.next.action();
    }

    fn schedule_iframe(&mut self, info: IFrameInfo) {
        self.next.kind = Some(FrameKind::Information);
        self.next.iframe = info;
        self.action = NextAction::SendIFrame;
    }

    fn schedule_rframe(&mut self, error: RErrorCode) {
        self.next.kind = Some(FrameKind::Receive);
        self.next.rframe = RFrameInfo {
            seq: self.rx.iframe_seq.toggled(),
            error,
        };
        self.action = self.next.action();
    }

    fn schedule_sframe(&mut self, s_type: SFrameType, inf: Option<u8>) {
        self.next.kind = Some(FrameKind::Supervisory);
        self.next.sframe = SFrameInfo { s_type, inf };
        self.action = self.next.action();
    }

    fn finish(&mut self, outcome: Outcome) {
        self.action = NextAction::Idle;
        self.outcome = outcome;
    }
}

/// Non-timeout transport errors end the exchange as `TransportFailure`.
fn hard_failure(e: Error) -> Error {
    match e {
        Error::TransportFailure(_) | Error::InvalidState(_) => e,
        other => Error::TransportFailure(other.to_string()),
    }
}
