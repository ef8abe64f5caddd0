// libese/libese/src/session/builder.rs

//! Builder assembling a closed session.

use crate::config::{ConfigSource, EngineConfig};
use crate::engine::{Engine, RErrorPolicy, default_r_error_policy};
use crate::power::{NoopPowerManager, PowerManager};
use crate::session::handle::{Closed, Session};
use crate::transport::Transport;
use crate::{Error, Result};

/// Helper to construct a Session with optional configuration.
pub struct SessionBuilder {
    transport: Option<Box<dyn Transport>>,
    power: Option<Box<dyn PowerManager>>,
    config: EngineConfig,
    r_error_policy: RErrorPolicy,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Builder with default config and no transport.
    pub fn new() -> Self {
        Self {
            transport: None,
            power: None,
            config: EngineConfig::default(),
            r_error_policy: default_r_error_policy,
        }
    }

    /// Transport used for every exchange. Required.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults to [`NoopPowerManager`] when not set.
    pub fn with_power_manager(mut self, power: Box<dyn PowerManager>) -> Self {
        self.power = Some(power);
        self
    }

    /// Engine configuration; replaces any earlier `with_config_source`.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the engine configuration from named values.
    pub fn with_config_source(mut self, source: &dyn ConfigSource) -> Self {
        self.config = EngineConfig::from_source(source);
        self
    }

    /// Override how R-frame errors are handled.
    pub fn with_r_error_policy(mut self, policy: RErrorPolicy) -> Self {
        self.r_error_policy = policy;
        self
    }

    /// Validate the configuration and return a closed session.
    /// Requires a transport to be provided.
    pub fn build(self) -> Result<Session<Closed>> {
        let transport = self
            .transport
            .ok_or_else(|| Error::InvalidArgument("no transport configured".into()))?;
        self.config.validate()?;
        let engine = Engine::new(self.config).with_r_error_policy(self.r_error_policy);
        let power = self
            .power
            .unwrap_or_else(|| Box::new(NoopPowerManager) as Box<dyn PowerManager>);
        Ok(Session::new(engine, transport, power))
    }
}
