// libese/libese/src/power/noop.rs

//! Power manager for hosts without power arbitration.

use crate::power::traits::{PowerManager, PowerOp, PowerState};
use crate::Result;

/// For platforms where the SPI host is the only master: always idle,
/// every request succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPowerManager;

impl PowerManager for NoopPowerManager {
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }

    fn state(&self) -> Result<PowerState> {
        Ok(PowerState::IDLE)
    }

    fn configure(&mut self, op: PowerOp) -> Result<()> {
        log::trace!("power {} (no-op)", op);
        Ok(())
    }
}
