// libese/libese/src/power/mock.rs

//! Scriptable power manager for tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::power::traits::{PowerManager, PowerOp, PowerState};
use crate::{Error, Result};

/// Call recorded by [`MockPowerManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCall {
    /// `acquire` was called.
    Acquire,
    /// `release` was called.
    Release,
    /// `configure` was called with this op.
    Configure(PowerOp),
}

#[derive(Debug)]
struct MockPowerState {
    state: PowerState,
    calls: Vec<PowerCall>,
    failing_op: Option<PowerOp>,
}

/// Power manager double that tracks SPI ownership and records calls.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct MockPowerManager {
    inner: Arc<Mutex<MockPowerState>>,
}

impl Default for MockPowerManager {
    fn default() -> Self {
        Self::with_state(PowerState::IDLE)
    }
}

impl MockPowerManager {
    /// Mock starting in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock starting in `state`.
    pub fn with_state(state: PowerState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockPowerState {
                state,
                calls: Vec::new(),
                failing_op: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockPowerState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `configure(op)` fail.
    pub fn fail_on(&self, op: PowerOp) {
        self.lock().failing_op = Some(op);
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<PowerCall> {
        self.lock().calls.clone()
    }

    /// Current power state.
    pub fn current(&self) -> PowerState {
        self.lock().state
    }
}

impl PowerManager for MockPowerManager {
    fn acquire(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(PowerCall::Acquire);
        if !inner.state.spi_available() {
            return Err(Error::Busy);
        }
        inner.state = PowerState::SPI;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(PowerCall::Release);
        inner.state = PowerState::IDLE;
        Ok(())
    }

    fn state(&self) -> Result<PowerState> {
        Ok(self.lock().state)
    }

    fn configure(&mut self, op: PowerOp) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(PowerCall::Configure(op));
        if inner.failing_op == Some(op) {
            return Err(Error::Power(format!("{} rejected", op)));
        }
        Ok(())
    }
}
