// libese/libese/src/config.rs

//! Engine tuning knobs and the named-value source they can be loaded from.

use std::collections::HashMap;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::utils::{DEFAULT_READ_TIMEOUT_MS, us};
use crate::{Error, Result};

/// Read-only access to named numeric configuration values.
pub trait ConfigSource {
    /// Value stored under `name`, if any.
    fn num_value(&self, name: &str) -> Option<u64>;
}

impl ConfigSource for HashMap<String, u64> {
    fn num_value(&self, name: &str) -> Option<u64> {
        self.get(name).copied()
    }
}

impl ConfigSource for HashMap<&str, u64> {
    fn num_value(&self, name: &str) -> Option<u64> {
        self.get(name).copied()
    }
}

/// No configuration: every lookup falls back to the compiled-in default.
impl ConfigSource for () {
    fn num_value(&self, _name: &str) -> Option<u64> {
        None
    }
}

/// Parameters for one protocol engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Bound on frame-level recovery attempts before escalating.
    pub frame_retry_limit: u32,
    /// Bound on retransmissions after a transport timeout.
    pub timeout_retry_limit: u32,
    /// WTX requests answered in a row before forcing an interface reset.
    pub wtx_counter_limit: u32,
    /// IFSC: largest INF field sent to the card.
    pub max_frame_size: u16,
    /// Settle delay before recovering from a frame error, in microseconds.
    pub recovery_delay_us: u64,
    /// Blocking receive timeout per frame, in milliseconds.
    pub read_timeout_ms: u64,
    /// Open in normal mode with an interface reset instead of a resynch.
    pub interface_reset_on_open: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_retry_limit: DEFAULT_FRAME_RETRY_LIMIT,
            timeout_retry_limit: DEFAULT_TIMEOUT_RETRY_LIMIT,
            wtx_counter_limit: DEFAULT_WTX_COUNTER_LIMIT,
            max_frame_size: DEFAULT_IFSC,
            recovery_delay_us: DEFAULT_RECOVERY_DELAY_US,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            interface_reset_on_open: true,
        }
    }
}

impl EngineConfig {
    /// Load from `source`, keeping defaults for absent keys. Values that do
    /// not fit their field are ignored with a warning.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = read_u32(source, CONFIG_WTX_COUNT_VALUE) {
            cfg.wtx_counter_limit = v;
        }
        if let Some(v) = read_u32(source, CONFIG_MAX_RNACK_RETRY) {
            cfg.frame_retry_limit = v;
        }
        if let Some(v) = read_u32(source, CONFIG_TIMEOUT_RETRY_COUNT) {
            cfg.timeout_retry_limit = v;
        }
        if let Some(v) = source.num_value(CONFIG_IFSC_SIZE) {
            match u16::try_from(v) {
                Ok(v) => cfg.max_frame_size = v,
                Err(_) => log::warn!("ignoring {}={}: out of range", CONFIG_IFSC_SIZE, v),
            }
        }
        if let Some(v) = source.num_value(CONFIG_ERROR_RECOVERY_DELAY_US) {
            cfg.recovery_delay_us = v;
        }
        if let Some(v) = source.num_value(CONFIG_READ_TIMEOUT_MS) {
            cfg.read_timeout_ms = v;
        }
        if let Some(v) = source.num_value(CONFIG_SPI_INTF_RST_ENABLE) {
            cfg.interface_reset_on_open = v != 0;
        }
        log::debug!("engine config: {:?}", cfg);
        cfg
    }

    /// Set the frame retry limit.
    pub fn with_frame_retry_limit(mut self, limit: u32) -> Self {
        self.frame_retry_limit = limit;
        self
    }

    /// Set the timeout retry limit.
    pub fn with_timeout_retry_limit(mut self, limit: u32) -> Self {
        self.timeout_retry_limit = limit;
        self
    }

    /// Set the number of WTX requests honoured in a row.
    pub fn with_wtx_counter_limit(mut self, limit: u32) -> Self {
        self.wtx_counter_limit = limit;
        self
    }

    /// Set the IFSC.
    pub fn with_max_frame_size(mut self, size: u16) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set the recovery settle delay.
    pub fn with_recovery_delay_us(mut self, delay: u64) -> Self {
        self.recovery_delay_us = delay;
        self
    }

    /// Set the per-frame read timeout.
    pub fn with_read_timeout_ms(mut self, timeout: u64) -> Self {
        self.read_timeout_ms = timeout;
        self
    }

    /// Choose between interface reset and resynch in normal open mode.
    pub fn with_interface_reset_on_open(mut self, enabled: bool) -> Self {
        self.interface_reset_on_open = enabled;
        self
    }

    /// Recovery settle delay as a `Duration`.
    pub fn recovery_delay(&self) -> Duration {
        us(self.recovery_delay_us)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_frame_size(self.max_frame_size)?;
        if self.frame_retry_limit == 0 || self.frame_retry_limit > MAX_FRAME_RETRY_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "frame retry limit {} outside 1..={}",
                self.frame_retry_limit, MAX_FRAME_RETRY_LIMIT
            )));
        }
        if self.read_timeout_ms == 0 {
            return Err(Error::InvalidArgument("read timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// IFSC must fit a LEN byte and leave room for at least one INF byte.
pub fn validate_frame_size(size: u16) -> Result<()> {
    if size == 0 || size as usize > MAX_INF_LEN {
        return Err(Error::InvalidArgument(format!(
            "max frame size {} outside 1..={}",
            size, MAX_INF_LEN
        )));
    }
    Ok(())
}

fn read_u32(source: &dyn ConfigSource, name: &str) -> Option<u32> {
    let v = source.num_value(name)?;
    match u32::try_from(v) {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {}={}: out of range", name, v);
            None
        }
    }
}
