//! Timeout and delay helpers.

use std::time::Duration;

/// Default time the transport waits for a response frame.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convert microseconds to Duration.
pub fn us(us: u64) -> Duration {
    Duration::from_micros(us)
}

/// Block the calling thread for `delay`; zero returns immediately.
pub fn settle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
