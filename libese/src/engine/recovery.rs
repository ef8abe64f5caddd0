// libese/libese/src/engine/recovery.rs

//! Retry budgets and the interface-reset escalation.

use crate::types::RErrorCode;

/// What to do when the card reports an error in an R-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Send the last frame again, byte for byte.
    Resend,
    /// Answer with an R-NACK.
    Nack,
    /// Skip retries and reset the interface.
    Escalate,
}

/// Maps an R-frame error code to a recovery action. Retries it requests are
/// still bounded by the frame retry limit.
pub type RErrorPolicy = fn(RErrorCode) -> RecoveryAction;

/// Resend the last frame whatever the card complained about.
pub fn default_r_error_policy(_error: RErrorCode) -> RecoveryAction {
    RecoveryAction::Resend
}

/// Result of running out of retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Send an interface reset with a fresh retry budget.
    InterfaceReset,
    /// Give up on the exchange.
    Exhausted,
}

/// Per-exchange retry counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryCounters {
    /// Frame-level retries since the last progress.
    pub recovery_attempts: u32,
    /// Timeout retransmissions since the last frame arrived.
    pub timeout_attempts: u32,
    /// The one interface-reset escalation of this exchange has been used.
    pub escalated: bool,
}

impl RecoveryCounters {
    /// Clear all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count one frame-level retry if the budget allows it.
    pub fn try_frame_retry(&mut self, limit: u32) -> bool {
        if self.recovery_attempts < limit {
            self.recovery_attempts += 1;
            true
        } else {
            false
        }
    }

    /// Count one timeout retry if the budget allows it.
    pub fn try_timeout_retry(&mut self, limit: u32) -> bool {
        if self.timeout_attempts < limit {
            self.timeout_attempts += 1;
            true
        } else {
            false
        }
    }

    /// The first call per exchange grants an interface reset with a fresh
    /// retry budget; later calls report exhaustion.
    pub fn escalate(&mut self) -> Escalation {
        if self.escalated {
            Escalation::Exhausted
        } else {
            self.escalated = true;
            self.recovery_attempts = 0;
            Escalation::InterfaceReset
        }
    }

    /// A frame moved the exchange forward.
    pub fn on_progress(&mut self) {
        self.recovery_attempts = 0;
    }
}
