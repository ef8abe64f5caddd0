// libese/libese/src/session/handle.rs

//! Type-state session handle.

use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};

use crate::engine::Engine;
use crate::power::{PowerManager, PowerOp};
use crate::transport::Transport;
use crate::types::{OpenMode, SessionState};
use crate::{Error, Result};

/// Marker for a session that is not open.
pub struct Closed;
/// Marker for a session with an established link.
pub struct Opened;

/// Everything an exchange needs, guarded together.
struct Link {
    engine: Engine,
    transport: Box<dyn Transport>,
    power: Box<dyn PowerManager>,
}

impl Link {
    fn bring_up(&mut self, mode: OpenMode) -> Result<()> {
        self.transport.reset()?;
        self.engine.reset_params();
        match mode {
            OpenMode::Normal if self.engine.config().interface_reset_on_open => {
                self.engine.interface_reset(&mut *self.transport)
            }
            _ => self.engine.resync(&mut *self.transport),
        }
    }

    fn power_down(&mut self) -> Result<()> {
        let disabled = self.power.configure(PowerOp::Disable);
        let released = self.power.release();
        disabled.and(released)
    }
}

/// Clears the busy flag when the operation holding it returns.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, op: &str) -> Result<Self> {
        match flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed) {
            Ok(_) => Ok(Self(flag)),
            Err(_) => {
                warn!("{} rejected: exchange in progress", op);
                Err(Error::InvalidState(format!(
                    "{} while an exchange is in progress",
                    op
                )))
            }
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Secure-element session handle that enforces open/closed state at compile
/// time. Operations on an opened session take `&self`; a call made while
/// another is running fails with [`Error::InvalidState`] without touching
/// the transport.
pub struct Session<State = Closed> {
    link: Mutex<Link>,
    busy: AtomicBool,
    _state: PhantomData<State>,
}

impl<State> Session<State> {
    fn from_link(link: Link) -> Self {
        Self {
            link: Mutex::new(link),
            busy: AtomicBool::new(false),
            _state: PhantomData,
        }
    }

    fn into_link(self) -> Link {
        self.link
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Session<Closed> {
    /// Wrap an engine, transport and power manager into a closed session.
    pub fn new(
        engine: Engine,
        transport: Box<dyn Transport>,
        power: Box<dyn PowerManager>,
    ) -> Self {
        Self::from_link(Link {
            engine,
            transport,
            power,
        })
    }

    /// Claim the secure element and bring the link up. `Normal` performs an
    /// interface reset, `Update` a resynchronisation. On failure power is
    /// disabled and access released again.
    pub fn open(self, mode: OpenMode) -> Result<Session<Opened>> {
        let mut link = self.into_link();

        let state = link.power.state()?;
        if !state.spi_available() {
            warn!("secure element unavailable, power state {}", state);
            return Err(Error::Busy);
        }
        link.power.acquire()?;
        if let Err(e) = link.power.configure(PowerOp::Enable) {
            error!("power enable failed: {}", e);
            if let Err(release) = link.power.release() {
                warn!("release after failed open: {}", release);
            }
            return Err(e);
        }

        if let Err(e) = link.bring_up(mode) {
            error!("open ({}) failed: {}", mode, e);
            if let Err(down) = link.power_down() {
                warn!("power down after failed open: {}", down);
            }
            return Err(e);
        }

        info!("session opened ({} mode)", mode);
        Ok(Session::from_link(link))
    }
}

impl Session<Opened> {
    fn with_link<T>(&self, op: &str, f: impl FnOnce(&mut Link) -> Result<T>) -> Result<T> {
        let _guard = BusyGuard::acquire(&self.busy, op)?;
        let mut link = self
            .link
            .lock()
            .map_err(|_| Error::InvalidState("session lock poisoned".into()))?;
        f(&mut *link)
    }

    /// Send one command APDU and return the complete response.
    pub fn transceive(&self, command: &[u8]) -> Result<Vec<u8>> {
        if command.is_empty() {
            return Err(Error::InvalidArgument("empty command".into()));
        }
        self.with_link("transceive", |link| {
            link.engine.transceive(&mut *link.transport, command)
        })
    }

    /// Interface reset followed by a power-manager reset. Both run; the
    /// interface reset error wins if both fail.
    pub fn reset(&self) -> Result<()> {
        self.with_link("reset", |link| {
            let status = link.engine.interface_reset(&mut *link.transport);
            let power = link.power.configure(PowerOp::Reset);
            if let Err(e) = &power {
                warn!("power reset failed: {}", e);
            }
            status.and(power)
        })
    }

    /// Reset protocol parameters and resynchronise with the card.
    pub fn resync(&self) -> Result<()> {
        self.with_link("resync", |link| link.engine.resync(&mut *link.transport))
    }

    /// Tell the card the APDU session has ended.
    pub fn end_of_session(&self) -> Result<()> {
        self.with_link("end of session", |link| {
            link.engine.end_of_session(&mut *link.transport)
        })
    }

    /// Set the IFSC used to split outgoing commands, 1..=254.
    pub fn set_max_frame_size(&self, size: u16) -> Result<()> {
        self.with_link("set max frame size", |link| link.engine.set_ifsc(size))
    }

    /// Current IFSC.
    pub fn max_frame_size(&self) -> Result<usize> {
        self.with_link("max frame size", |link| Ok(link.engine.ifsc()))
    }

    /// Whether an exchange is running right now.
    pub fn state(&self) -> SessionState {
        if self.busy.load(Ordering::Acquire) {
            SessionState::Transceiving
        } else {
            SessionState::Idle
        }
    }

    /// Power down and release the secure element. The returned session can
    /// be opened again; on error the transport is dropped.
    pub fn close(self) -> Result<Session<Closed>> {
        let mut link = self.into_link();
        link.power_down()?;
        debug!("session closed");
        Ok(Session::from_link(link))
    }
}
