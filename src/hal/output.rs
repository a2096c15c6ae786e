//! Output Engine contract
//!
//! The PIO state machine that drives the R2R ladder is an external
//! collaborator. The pipeline only needs its TX FIFO address and the DREQ it
//! asserts whenever it can take the next word; [`OutputEngine`] captures
//! exactly that.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::dma::Pacing;
use crate::internal::constants::{
    DEFAULT_DATA_BASE, DEFAULT_DATA_PINS, MAX_OUT_PINS, PIO_BLOCKS, PIO_STATE_MACHINES,
    USER_GPIO_COUNT,
};
use crate::internal::register::{PIO_TXF0_OFFSET, PIO0_BASE, PIO1_BASE};

/// A word sink paced by a hardware request signal.
///
/// Implementations accept exactly one 32-bit word per pacing assertion.
pub trait OutputEngine {
    /// Bus address of the FIFO the data channel writes to
    fn fifo_address(&self) -> u32;

    /// Request signal the data channel waits on
    fn pacing(&self) -> Pacing;
}

// =============================================================================
// PIO TX FIFO
// =============================================================================

/// PIO block selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PioBlock {
    /// PIO0
    Pio0,
    /// PIO1
    Pio1,
}

impl PioBlock {
    /// Block index (0 or 1)
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            PioBlock::Pio0 => 0,
            PioBlock::Pio1 => 1,
        }
    }

    /// Block from index
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PioBlock::Pio0),
            1 => Some(PioBlock::Pio1),
            _ => None,
        }
    }

    const fn base(self) -> usize {
        match self {
            PioBlock::Pio0 => PIO0_BASE,
            PioBlock::Pio1 => PIO1_BASE,
        }
    }
}

/// TX FIFO of one PIO state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PioTxFifo {
    block: PioBlock,
    sm: u8,
}

impl PioTxFifo {
    /// TX FIFO of state machine `sm` (0..=3) in `block`
    pub const fn new(block: PioBlock, sm: u8) -> ConfigResult<Self> {
        if sm >= PIO_STATE_MACHINES {
            return Err(ConfigError::InvalidChannel);
        }
        Ok(Self { block, sm })
    }

    /// PIO block
    pub const fn block(&self) -> PioBlock {
        self.block
    }

    /// State machine index within the block
    pub const fn state_machine(&self) -> u8 {
        self.sm
    }

    /// Flat index over all state machines (PIO0 SM0 = 0, PIO1 SM3 = 7)
    pub const fn flat_index(&self) -> u8 {
        self.block.index() * PIO_STATE_MACHINES + self.sm
    }

    /// Inverse of [`PioTxFifo::flat_index`]
    pub const fn from_flat_index(index: u8) -> Option<Self> {
        if index >= PIO_BLOCKS * PIO_STATE_MACHINES {
            return None;
        }
        match PioBlock::from_index(index / PIO_STATE_MACHINES) {
            Some(block) => Some(Self {
                block,
                sm: index % PIO_STATE_MACHINES,
            }),
            None => None,
        }
    }
}

impl OutputEngine for PioTxFifo {
    fn fifo_address(&self) -> u32 {
        (self.block.base() + PIO_TXF0_OFFSET + 4 * self.sm as usize) as u32
    }

    // TX DREQs come first in each block: PIO0 TX0..3 = 0..3, PIO1 TX0..3 = 8..11
    fn pacing(&self) -> Pacing {
        Pacing::Dreq(self.block.index() * 8 + self.sm)
    }
}

// =============================================================================
// Pin Range
// =============================================================================

/// Contiguous GPIO range driven by the Output Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinRange {
    base: u8,
    count: u8,
}

impl PinRange {
    /// GPIO2..=GPIO9, the 8-bit ladder wiring
    pub const DEFAULT: Self = Self {
        base: DEFAULT_DATA_BASE,
        count: DEFAULT_DATA_PINS,
    };

    /// Validate a range of `count` pins starting at GPIO `base`
    pub const fn new(base: u8, count: u8) -> ConfigResult<Self> {
        if count == 0 || count > MAX_OUT_PINS || base as u16 + count as u16 > USER_GPIO_COUNT as u16
        {
            return Err(ConfigError::InvalidPinRange);
        }
        Ok(Self { base, count })
    }

    /// First GPIO
    pub const fn base(&self) -> u8 {
        self.base
    }

    /// Number of pins
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// GPIO bit mask covered by the range
    pub const fn mask(&self) -> u32 {
        let width = if self.count >= 32 {
            u32::MAX
        } else {
            (1u32 << self.count) - 1
        };
        width << self.base
    }
}

impl Default for PinRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// R2R Program Image
// =============================================================================

/// `pull block` encoding
const PULL_BLOCK: u16 = 0x80A0;
/// `out pins, 0` encoding; the low five bits carry the bit count (32 = 0)
const OUT_PINS: u16 = 0x6000;

/// Two-instruction PIO program shifting one word per FIFO entry onto the pins.
///
/// ```text
/// .wrap_target
///     pull block
///     out pins, <count>
/// .wrap
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct R2rProgram {
    pins: PinRange,
}

impl R2rProgram {
    /// Program driving `pins`
    pub const fn new(pins: PinRange) -> Self {
        Self { pins }
    }

    /// Encoded instructions
    pub const fn instructions(&self) -> [u16; 2] {
        [PULL_BLOCK, OUT_PINS | (self.pins.count() as u16 & 0x1F)]
    }

    /// Wrap target and wrap source, relative to the load offset
    pub const fn wrap(&self) -> (u8, u8) {
        (0, 1)
    }

    /// Pins the program drives
    pub const fn pins(&self) -> PinRange {
        self.pins
    }
}
