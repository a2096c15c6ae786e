//! ISR-safe resource allocators using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::error::{ClaimError, ClaimResult};
use crate::hal::dma::ChannelId;
use crate::hal::output::{PinRange, PioTxFifo};
use crate::hal::pool::{ChannelPool, PinPool, StateMachinePool};

/// Chip-wide allocators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pools {
    /// DMA channels
    pub channels: ChannelPool,
    /// PIO state machines
    pub state_machines: StateMachinePool,
    /// Bank 0 GPIOs
    pub pins: PinPool,
}

impl Pools {
    /// Every resource free
    pub const fn new() -> Self {
        Self {
            channels: ChannelPool::new(),
            state_machines: StateMachinePool::new(),
            pins: PinPool::new(),
        }
    }
}

/// Everything one pipeline needs, claimed together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineResources {
    /// Control channel
    pub control: ChannelId,
    /// Data channel
    pub data: ChannelId,
    /// Output state machine
    pub output: PioTxFifo,
    /// Ladder pins
    pub pins: PinRange,
}

/// ISR-safe wrapper around the chip-wide [`Pools`].
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the claim.
///
/// # Example
///
/// ```ignore
/// static RESOURCES: SharedResources = SharedResources::new();
///
/// let res = RESOURCES.claim_pipeline(PinRange::default())?;
/// let pipeline = Pipeline::new(dma, res.control, res.data, config)?;
/// ```
pub struct SharedResources {
    inner: CriticalSectionCell<Pools>,
}

impl SharedResources {
    /// Create the allocators (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(Pools::new()),
        }
    }

    /// Execute a closure with exclusive access to the pools.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Pools) -> R,
    {
        self.inner.with(f)
    }

    /// Claim the lowest free DMA channel
    pub fn claim_channel(&self) -> ClaimResult<ChannelId> {
        self.with(|pools| pools.channels.claim())
    }

    /// Return a DMA channel
    pub fn release_channel(&self, channel: ChannelId) -> ClaimResult<()> {
        self.with(|pools| pools.channels.release(channel))
    }

    /// Claim the first free PIO state machine
    pub fn claim_state_machine(&self) -> ClaimResult<PioTxFifo> {
        self.with(|pools| pools.state_machines.claim())
    }

    /// Return a PIO state machine
    pub fn release_state_machine(&self, fifo: PioTxFifo) -> ClaimResult<()> {
        self.with(|pools| pools.state_machines.release(fifo))
    }

    /// Claim a pin range
    pub fn claim_pins(&self, range: PinRange) -> ClaimResult<PinRange> {
        self.with(|pools| pools.pins.claim(range))
    }

    /// Return a pin range
    pub fn release_pins(&self, range: PinRange) -> ClaimResult<()> {
        self.with(|pools| pools.pins.release(range))
    }

    /// Claim two channels, a state machine and `pins` in one critical
    /// section. Nothing stays claimed if any claim fails.
    pub fn claim_pipeline(&self, pins: PinRange) -> ClaimResult<PipelineResources> {
        self.with(|pools| {
            let mut staged = *pools;
            let control = staged.channels.claim()?;
            let data = staged.channels.claim()?;
            let output = staged.state_machines.claim()?;
            let pins = staged.pins.claim(pins)?;
            *pools = staged;
            Ok(PipelineResources {
                control,
                data,
                output,
                pins,
            })
        })
    }

    /// Return everything [`SharedResources::claim_pipeline`] handed out
    pub fn release_pipeline(&self, res: PipelineResources) -> ClaimResult<()> {
        self.with(|pools| {
            let mut staged = *pools;
            staged.channels.release(res.control)?;
            staged.channels.release(res.data)?;
            staged.state_machines.release(res.output)?;
            staged.pins.release(res.pins)?;
            *pools = staged;
            Ok::<(), ClaimError>(())
        })
    }
}

impl Default for SharedResources {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_claim_takes_two_channels() {
        let shared = SharedResources::new();
        let res = shared.claim_pipeline(PinRange::default()).unwrap();
        assert_ne!(res.control, res.data);
        assert_eq!(shared.with(|pools| pools.channels.free()), 10);
        assert!(shared.with(|pools| pools.pins.is_claimed(2)));
    }

    #[test]
    fn failed_pipeline_claim_leaves_pools_untouched() {
        let shared = SharedResources::new();
        shared.claim_pins(PinRange::new(5, 1).unwrap()).unwrap();
        let before = shared.with(|pools| *pools);

        assert_eq!(
            shared.claim_pipeline(PinRange::default()),
            Err(ClaimError::PinRangeInUse)
        );
        assert_eq!(shared.with(|pools| *pools), before);
    }

    #[test]
    fn release_pipeline_frees_everything() {
        let shared = SharedResources::new();
        let res = shared.claim_pipeline(PinRange::default()).unwrap();
        shared.release_pipeline(res).unwrap();
        assert_eq!(shared.with(|pools| *pools), Pools::new());
        assert_eq!(shared.release_pipeline(res), Err(ClaimError::NotClaimed));
    }

    #[test]
    fn static_shared_resources() {
        static RESOURCES: SharedResources = SharedResources::new();
        let sm = RESOURCES.claim_state_machine().unwrap();
        RESOURCES.release_state_machine(sm).unwrap();
        let ch = RESOURCES.claim_channel().unwrap();
        RESOURCES.release_channel(ch).unwrap();
        assert_eq!(RESOURCES.with(|pools| *pools), Pools::new());
    }
}
