// libese/libese/src/power/mod.rs

//! Secure-element power and access arbitration.

pub mod mock;
pub mod noop;
pub mod traits;

pub use mock::MockPowerManager;
pub use noop::NoopPowerManager;
pub use traits::{PowerManager, PowerOp, PowerState};
