//! Resource allocators for DMA channels, PIO state machines and pins.
//!
//! DMA channels, state machines and GPIOs are chip-wide singletons. Each pool
//! tracks ownership in a bit mask and reports exhaustion as a [`ClaimError`].
//! For ISR-safe `static` pools see [`crate::sync::SharedResources`].

use crate::driver::error::{ClaimError, ClaimResult};
use crate::hal::dma::ChannelId;
use crate::hal::output::{PinRange, PioTxFifo};
use crate::internal::constants::{DMA_CHANNELS, PIO_BLOCKS, PIO_STATE_MACHINES};

/// Bit set over `WIDTH` slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitPool<const WIDTH: u8> {
    claimed: u32,
}

impl<const WIDTH: u8> BitPool<WIDTH> {
    const fn new() -> Self {
        Self { claimed: 0 }
    }

    fn claim_any(&mut self) -> Option<u8> {
        let index = (0..WIDTH).find(|&i| self.claimed & (1 << i) == 0)?;
        self.claimed |= 1 << index;
        Some(index)
    }

    fn claim_mask(&mut self, mask: u32) -> bool {
        if self.claimed & mask != 0 {
            return false;
        }
        self.claimed |= mask;
        true
    }

    fn release_mask(&mut self, mask: u32) -> bool {
        if self.claimed & mask != mask {
            return false;
        }
        self.claimed &= !mask;
        true
    }

    const fn free(&self) -> u32 {
        WIDTH as u32 - self.claimed.count_ones()
    }
}

// =============================================================================
// DMA Channels
// =============================================================================

/// Allocator for DMA channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPool {
    bits: BitPool<DMA_CHANNELS>,
}

impl ChannelPool {
    /// Pool with every channel free
    pub const fn new() -> Self {
        Self {
            bits: BitPool::new(),
        }
    }

    /// Claim the lowest-numbered free channel
    pub fn claim(&mut self) -> ClaimResult<ChannelId> {
        let index = self.bits.claim_any().ok_or(ClaimError::NoFreeChannel)?;
        ChannelId::new(index).map_err(|_| ClaimError::NoFreeChannel)
    }

    /// Claim a specific channel
    pub fn claim_specific(&mut self, channel: ChannelId) -> ClaimResult<ChannelId> {
        if self.bits.claim_mask(channel.mask()) {
            Ok(channel)
        } else {
            Err(ClaimError::ChannelInUse)
        }
    }

    /// Return a channel to the pool
    pub fn release(&mut self, channel: ChannelId) -> ClaimResult<()> {
        if self.bits.release_mask(channel.mask()) {
            Ok(())
        } else {
            Err(ClaimError::NotClaimed)
        }
    }

    /// Number of unclaimed channels
    pub const fn free(&self) -> u32 {
        self.bits.free()
    }
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PIO State Machines
// =============================================================================

/// Allocator for PIO state machines across both blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachinePool {
    bits: BitPool<{ PIO_BLOCKS * PIO_STATE_MACHINES }>,
}

impl StateMachinePool {
    /// Pool with every state machine free
    pub const fn new() -> Self {
        Self {
            bits: BitPool::new(),
        }
    }

    /// Claim the first free state machine, PIO0 before PIO1
    pub fn claim(&mut self) -> ClaimResult<PioTxFifo> {
        let index = self.bits.claim_any().ok_or(ClaimError::NoFreeStateMachine)?;
        PioTxFifo::from_flat_index(index).ok_or(ClaimError::NoFreeStateMachine)
    }

    /// Claim a specific state machine
    pub fn claim_specific(&mut self, fifo: PioTxFifo) -> ClaimResult<PioTxFifo> {
        if self.bits.claim_mask(1 << fifo.flat_index()) {
            Ok(fifo)
        } else {
            Err(ClaimError::StateMachineInUse)
        }
    }

    /// Return a state machine to the pool
    pub fn release(&mut self, fifo: PioTxFifo) -> ClaimResult<()> {
        if self.bits.release_mask(1 << fifo.flat_index()) {
            Ok(())
        } else {
            Err(ClaimError::NotClaimed)
        }
    }

    /// Number of unclaimed state machines
    pub const fn free(&self) -> u32 {
        self.bits.free()
    }
}

impl Default for StateMachinePool {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// GPIO Pins
// =============================================================================

/// Allocator for GPIO ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinPool {
    claimed: u32,
}

impl PinPool {
    /// Pool with every pin free
    pub const fn new() -> Self {
        Self { claimed: 0 }
    }

    /// Claim every pin in `range`, all or nothing
    pub fn claim(&mut self, range: PinRange) -> ClaimResult<PinRange> {
        if self.claimed & range.mask() != 0 {
            return Err(ClaimError::PinRangeInUse);
        }
        self.claimed |= range.mask();
        Ok(range)
    }

    /// Return a previously claimed range
    pub fn release(&mut self, range: PinRange) -> ClaimResult<()> {
        if self.claimed & range.mask() != range.mask() {
            return Err(ClaimError::NotClaimed);
        }
        self.claimed &= !range.mask();
        Ok(())
    }

    /// Whether a GPIO is claimed
    pub const fn is_claimed(&self, gpio: u8) -> bool {
        gpio < 32 && self.claimed & (1 << gpio) != 0
    }
}
