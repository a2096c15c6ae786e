//! Host-side model of the DMA block, SRAM and a PIO TX FIFO.
//!
//! [`SimBus`] implements [`crate::hal::DmaController`], so a
//! [`crate::Pipeline`] can be armed and started against it exactly as against
//! the hardware. The model is step-driven: every [`SimBus::step`] lets each
//! busy channel move at most one word and the FIFO shift out at most one.
//!
//! Modelled behaviour:
//!
//! - register aliases with trigger slots, including null triggers
//! - transfer-count reload on every trigger
//! - read and write rings (both sides at once, unlike the RP2040)
//! - chaining, `IRQ_QUIET`, `INTR`/`INTE0`/`INTS0`, `MULTI_CHAN_TRIGGER`
//! - DREQ pacing from the FIFO fill level
//!
//! Cycles where more than one channel is busy are counted, so tests can check
//! that the two engines strictly alternate.
//!
//! # Example
//!
//! ```ignore
//! let mut bus: SimBus<64, 32> = SimBus::new(fifo, 4, 2);
//! bus.load(SAMPLES, &[0xAA, 0x55])?;
//! let layout = bus.place(LIST, &list)?;
//! ```

mod bus;
mod fifo;
mod memory;

pub use bus::SimBus;
pub use fifo::{MAX_FIFO_DEPTH, SimFifo};
pub use memory::SimMemory;

use crate::driver::error::ConfigError;

/// Access to an unmapped or misaligned bus address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault {
    /// Faulting address
    pub address: u32,
}

impl core::fmt::Display for BusFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "bus fault at {:#010x}", self.address)
    }
}

/// Errors raised while setting up a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Memory image does not fit the modelled SRAM
    Bus(BusFault),
    /// List placement rejected
    Config(ConfigError),
}

impl core::fmt::Display for SimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SimError::Bus(e) => write!(f, "sim: {e}"),
            SimError::Config(e) => write!(f, "sim: {e}"),
        }
    }
}

impl From<BusFault> for SimError {
    fn from(e: BusFault) -> Self {
        SimError::Bus(e)
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}
