// libese/libese/src/engine/wtx.rs

//! Waiting-time extension governor.

/// Outcome of a waiting-time-extension request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WtxDecision {
    /// Grant the extension with a WTX response.
    Respond,
    /// Too many in a row: reset the interface instead.
    ForceReset,
}

/// Bounds consecutive WTX requests from the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WtxGovernor {
    count: u32,
    limit: u32,
}

impl WtxGovernor {
    /// Governor granting at most `limit` extensions in a row.
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Grants `limit` requests, then forces a reset and starts over.
    pub fn on_request(&mut self) -> WtxDecision {
        if self.count >= self.limit {
            self.count = 0;
            WtxDecision::ForceReset
        } else {
            self.count += 1;
            WtxDecision::Respond
        }
    }

    /// Any frame other than a WTX request ends the run.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Extensions granted in the current run.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configured ceiling.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}
