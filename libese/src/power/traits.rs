// libese/libese/src/power/traits.rs

//! Power arbitration interface.

use derive_more::Display;

use crate::Result;

/// Power request passed to [`PowerManager::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PowerOp {
    /// Remove power from the secure element.
    #[display(fmt = "disable")]
    Disable,
    /// Power it up.
    #[display(fmt = "enable")]
    Enable,
    /// Power cycle.
    #[display(fmt = "reset")]
    Reset,
    /// Start a priority SPI session.
    #[display(fmt = "priority enable")]
    PrioEnable,
    /// End a priority SPI session.
    #[display(fmt = "priority disable")]
    PrioDisable,
}

/// Bit set describing who currently holds the secure element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PowerState(u16);

impl PowerState {
    /// Nobody holds the secure element.
    pub const IDLE: Self = Self(0x0100);
    /// Held by the NFC controller over the wired interface.
    pub const WIRED: Self = Self(0x0200);
    /// Held by this SPI host.
    pub const SPI: Self = Self(0x0400);
    /// NFC controller firmware download in progress.
    pub const DOWNLOAD: Self = Self(0x0800);
    /// Priority SPI session in progress.
    pub const SPI_PRIO: Self = Self(0x1000);
    /// Priority SPI session just ended.
    pub const SPI_PRIO_END: Self = Self(0x2000);
    /// Applet OS download in progress.
    pub const OS_DOWNLOAD: Self = Self(0x8000);

    /// Wrap raw state bits.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw state bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Both sets of bits.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether an SPI session may be started in this state.
    pub const fn spi_available(self) -> bool {
        !(self.contains(Self::SPI)
            || self.contains(Self::SPI_PRIO)
            || self.contains(Self::DOWNLOAD)
            || self.contains(Self::OS_DOWNLOAD))
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Arbitrates access to the secure element between the SPI host and other
/// masters. Only consulted at open, close and reset.
pub trait PowerManager: Send {
    /// Claim exclusive SPI access.
    fn acquire(&mut self) -> Result<()>;

    /// Give up SPI access.
    fn release(&mut self) -> Result<()>;

    /// Current power state.
    fn state(&self) -> Result<PowerState>;

    /// Apply a power operation.
    fn configure(&mut self, op: PowerOp) -> Result<()>;
}
