//! DMA channel abstraction
//!
//! The pipeline programs two DMA channels through the [`DmaController`]
//! trait. Implementations are the RP2040 register backend
//! ([`crate::hal::rp2040::Rp2040Dma`]) and the host simulator.
//!
//! # Register aliases
//!
//! Each channel exposes its four control registers through four aliases.
//! [`ChannelRegister`] names every alias explicitly, and
//! [`ChannelRegister::is_trigger`] tells which writes start the channel.
//! [`DescriptorWindow`] fixes the pair of registers a descriptor is written
//! to: transfer count first, then the read address whose write triggers.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{DMA_CHANNELS, MAX_RING_BITS};
use crate::internal::register::dma::*;

// =============================================================================
// Channel Identity
// =============================================================================

/// Index of a DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(u8);

impl ChannelId {
    /// Create a channel id, rejecting indices beyond the controller
    pub const fn new(index: u8) -> ConfigResult<Self> {
        if index < DMA_CHANNELS {
            Ok(Self(index))
        } else {
            Err(ConfigError::InvalidChannel)
        }
    }

    /// Channel index
    #[inline(always)]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Bit of this channel in mask registers (INTR, MULTI_CHAN_TRIGGER)
    #[inline(always)]
    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

// =============================================================================
// Transfer Parameters
// =============================================================================

/// Width of a single bus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataSize {
    /// 8-bit transfers
    Byte = 0,
    /// 16-bit transfers
    HalfWord = 1,
    /// 32-bit transfers
    #[default]
    Word = 2,
}

impl DataSize {
    /// Bytes moved per transfer
    #[must_use]
    pub const fn bytes(self) -> u32 {
        1 << self as u32
    }
}

/// Pacing source (TREQ) of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// Peripheral data request, e.g. a PIO TX FIFO
    Dreq(u8),
    /// Transfer as fast as the bus allows
    #[default]
    Permanent,
}

impl Pacing {
    /// Encoded TREQ_SEL value
    #[must_use]
    pub const fn treq_sel(self) -> u32 {
        match self {
            Pacing::Dreq(dreq) => dreq as u32 & 0x3F,
            Pacing::Permanent => TREQ_PERMANENT,
        }
    }

    /// Decode a TREQ_SEL value
    #[must_use]
    pub const fn from_treq_sel(value: u32) -> Self {
        if value & 0x3F == TREQ_PERMANENT {
            Pacing::Permanent
        } else {
            Pacing::Dreq((value & 0x3F) as u8)
        }
    }
}

// =============================================================================
// Channel Configuration
// =============================================================================

/// Control settings of one DMA channel
///
/// Read and write rings are independent fields. The RP2040 can only wrap one
/// side per channel, so [`ChannelConfig::ctrl_bits`] rejects configurations
/// using both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Transfer width
    pub data_size: DataSize,
    /// Increment the read address after each transfer
    pub incr_read: bool,
    /// Increment the write address after each transfer
    pub incr_write: bool,
    /// Wrap the read address on a `1 << bits` byte boundary
    pub read_ring: Option<u8>,
    /// Wrap the write address on a `1 << bits` byte boundary
    pub write_ring: Option<u8>,
    /// Channel triggered when this one completes its count
    pub chain_to: Option<ChannelId>,
    /// Transfer request source
    pub pacing: Pacing,
    /// Raise the interrupt flag only on a null trigger
    pub irq_quiet: bool,
    /// Prioritise this channel in the bus arbiter
    pub high_priority: bool,
    /// Channel enable
    pub enable: bool,
}

impl ChannelConfig {
    /// Default configuration: 32-bit, read-incrementing, unpaced, unchained
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data_size: DataSize::Word,
            incr_read: true,
            incr_write: false,
            read_ring: None,
            write_ring: None,
            chain_to: None,
            pacing: Pacing::Permanent,
            irq_quiet: false,
            high_priority: false,
            enable: true,
        }
    }

    /// Set the transfer width
    #[must_use]
    pub const fn with_data_size(mut self, size: DataSize) -> Self {
        self.data_size = size;
        self
    }

    /// Set read address increment
    #[must_use]
    pub const fn with_read_increment(mut self, enabled: bool) -> Self {
        self.incr_read = enabled;
        self
    }

    /// Set write address increment
    #[must_use]
    pub const fn with_write_increment(mut self, enabled: bool) -> Self {
        self.incr_write = enabled;
        self
    }

    /// Wrap the read address every `1 << bits` bytes
    #[must_use]
    pub const fn with_read_ring(mut self, bits: u8) -> Self {
        self.read_ring = Some(bits);
        self
    }

    /// Wrap the write address every `1 << bits` bytes
    #[must_use]
    pub const fn with_write_ring(mut self, bits: u8) -> Self {
        self.write_ring = Some(bits);
        self
    }

    /// Trigger `channel` when this channel completes
    #[must_use]
    pub const fn with_chain_to(mut self, channel: ChannelId) -> Self {
        self.chain_to = Some(channel);
        self
    }

    /// Set the pacing source
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Only raise the interrupt flag on null triggers
    #[must_use]
    pub const fn with_irq_quiet(mut self, quiet: bool) -> Self {
        self.irq_quiet = quiet;
        self
    }

    /// Set bus priority
    #[must_use]
    pub const fn with_high_priority(mut self, high: bool) -> Self {
        self.high_priority = high;
        self
    }

    /// Encode the CTRL register value for `channel`.
    ///
    /// An unchained channel chains to itself, which the hardware treats as
    /// "no chain".
    pub fn ctrl_bits(&self, channel: ChannelId) -> ConfigResult<u32> {
        let ring = match (self.read_ring, self.write_ring) {
            (Some(_), Some(_)) => return Err(ConfigError::RingUnsupported),
            (Some(bits), None) => ring_field(bits)?,
            (None, Some(bits)) => ring_field(bits)? | CTRL_RING_SEL,
            (None, None) => 0,
        };

        let chain = self.chain_to.unwrap_or(channel).index() as u32;
        let mut bits = ring
            | ((self.data_size as u32) << CTRL_DATA_SIZE_SHIFT)
            | (chain << CTRL_CHAIN_TO_SHIFT)
            | (self.pacing.treq_sel() << CTRL_TREQ_SEL_SHIFT);

        if self.enable {
            bits |= CTRL_EN;
        }
        if self.high_priority {
            bits |= CTRL_HIGH_PRIORITY;
        }
        if self.incr_read {
            bits |= CTRL_INCR_READ;
        }
        if self.incr_write {
            bits |= CTRL_INCR_WRITE;
        }
        if self.irq_quiet {
            bits |= CTRL_IRQ_QUIET;
        }
        Ok(bits)
    }

    /// Decode a CTRL register value written for `channel`
    pub fn from_ctrl_bits(bits: u32, channel: ChannelId) -> ConfigResult<Self> {
        let ring_bits = ((bits & CTRL_RING_SIZE_MASK) >> CTRL_RING_SIZE_SHIFT) as u8;
        let ring = (ring_bits != 0).then_some(ring_bits);
        let (read_ring, write_ring) = if bits & CTRL_RING_SEL != 0 {
            (None, ring)
        } else {
            (ring, None)
        };

        let chain = ChannelId::new(((bits & CTRL_CHAIN_TO_MASK) >> CTRL_CHAIN_TO_SHIFT) as u8)?;
        let data_size = match (bits & CTRL_DATA_SIZE_MASK) >> CTRL_DATA_SIZE_SHIFT {
            0 => DataSize::Byte,
            1 => DataSize::HalfWord,
            _ => DataSize::Word,
        };

        Ok(Self {
            data_size,
            incr_read: bits & CTRL_INCR_READ != 0,
            incr_write: bits & CTRL_INCR_WRITE != 0,
            read_ring,
            write_ring,
            chain_to: (chain != channel).then_some(chain),
            pacing: Pacing::from_treq_sel((bits & CTRL_TREQ_SEL_MASK) >> CTRL_TREQ_SEL_SHIFT),
            irq_quiet: bits & CTRL_IRQ_QUIET != 0,
            high_priority: bits & CTRL_HIGH_PRIORITY != 0,
            enable: bits & CTRL_EN != 0,
        })
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn ring_field(bits: u8) -> ConfigResult<u32> {
    if bits == 0 || bits > MAX_RING_BITS {
        return Err(ConfigError::WrapMismatch);
    }
    Ok((bits as u32) << CTRL_RING_SIZE_SHIFT)
}

// =============================================================================
// Register Aliases
// =============================================================================

/// One register slot in a channel's alias block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelRegister {
    /// Alias 0 read address
    ReadAddr,
    /// Alias 0 write address
    WriteAddr,
    /// Alias 0 transfer count
    TransCount,
    /// Alias 0 control, trigger
    CtrlTrig,
    /// Alias 1 control
    Al1Ctrl,
    /// Alias 1 read address
    Al1ReadAddr,
    /// Alias 1 write address
    Al1WriteAddr,
    /// Alias 1 transfer count, trigger
    Al1TransCountTrig,
    /// Alias 2 control
    Al2Ctrl,
    /// Alias 2 transfer count
    Al2TransCount,
    /// Alias 2 read address
    Al2ReadAddr,
    /// Alias 2 write address, trigger
    Al2WriteAddrTrig,
    /// Alias 3 control
    Al3Ctrl,
    /// Alias 3 write address
    Al3WriteAddr,
    /// Alias 3 transfer count
    Al3TransCount,
    /// Alias 3 read address, trigger
    Al3ReadAddrTrig,
}

/// Which of the four physical registers an alias slot maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterField {
    /// READ_ADDR
    ReadAddr,
    /// WRITE_ADDR
    WriteAddr,
    /// TRANS_COUNT
    TransCount,
    /// CTRL
    Ctrl,
}

impl ChannelRegister {
    const ALL: [ChannelRegister; 16] = [
        ChannelRegister::ReadAddr,
        ChannelRegister::WriteAddr,
        ChannelRegister::TransCount,
        ChannelRegister::CtrlTrig,
        ChannelRegister::Al1Ctrl,
        ChannelRegister::Al1ReadAddr,
        ChannelRegister::Al1WriteAddr,
        ChannelRegister::Al1TransCountTrig,
        ChannelRegister::Al2Ctrl,
        ChannelRegister::Al2TransCount,
        ChannelRegister::Al2ReadAddr,
        ChannelRegister::Al2WriteAddrTrig,
        ChannelRegister::Al3Ctrl,
        ChannelRegister::Al3WriteAddr,
        ChannelRegister::Al3TransCount,
        ChannelRegister::Al3ReadAddrTrig,
    ];

    /// Byte offset within the channel block
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            ChannelRegister::ReadAddr => READ_ADDR_OFFSET,
            ChannelRegister::WriteAddr => WRITE_ADDR_OFFSET,
            ChannelRegister::TransCount => TRANS_COUNT_OFFSET,
            ChannelRegister::CtrlTrig => CTRL_TRIG_OFFSET,
            ChannelRegister::Al1Ctrl => AL1_CTRL_OFFSET,
            ChannelRegister::Al1ReadAddr => AL1_READ_ADDR_OFFSET,
            ChannelRegister::Al1WriteAddr => AL1_WRITE_ADDR_OFFSET,
            ChannelRegister::Al1TransCountTrig => AL1_TRANS_COUNT_TRIG_OFFSET,
            ChannelRegister::Al2Ctrl => AL2_CTRL_OFFSET,
            ChannelRegister::Al2TransCount => AL2_TRANS_COUNT_OFFSET,
            ChannelRegister::Al2ReadAddr => AL2_READ_ADDR_OFFSET,
            ChannelRegister::Al2WriteAddrTrig => AL2_WRITE_ADDR_TRIG_OFFSET,
            ChannelRegister::Al3Ctrl => AL3_CTRL_OFFSET,
            ChannelRegister::Al3WriteAddr => AL3_WRITE_ADDR_OFFSET,
            ChannelRegister::Al3TransCount => AL3_TRANS_COUNT_OFFSET,
            ChannelRegister::Al3ReadAddrTrig => AL3_READ_ADDR_TRIG_OFFSET,
        }
    }

    /// Slot at a byte offset within the channel block
    #[must_use]
    pub fn from_offset(offset: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|reg| reg.offset() == offset)
    }

    /// Whether writing this slot starts the channel
    #[must_use]
    pub const fn is_trigger(self) -> bool {
        self.offset() & 0xC == 0xC
    }

    /// Physical register behind this slot
    #[must_use]
    pub const fn field(self) -> RegisterField {
        match self {
            ChannelRegister::ReadAddr
            | ChannelRegister::Al1ReadAddr
            | ChannelRegister::Al2ReadAddr
            | ChannelRegister::Al3ReadAddrTrig => RegisterField::ReadAddr,
            ChannelRegister::WriteAddr
            | ChannelRegister::Al1WriteAddr
            | ChannelRegister::Al2WriteAddrTrig
            | ChannelRegister::Al3WriteAddr => RegisterField::WriteAddr,
            ChannelRegister::TransCount
            | ChannelRegister::Al1TransCountTrig
            | ChannelRegister::Al2TransCount
            | ChannelRegister::Al3TransCount => RegisterField::TransCount,
            ChannelRegister::CtrlTrig
            | ChannelRegister::Al1Ctrl
            | ChannelRegister::Al2Ctrl
            | ChannelRegister::Al3Ctrl => RegisterField::Ctrl,
        }
    }
}

/// Register pair a descriptor is copied into.
///
/// The transfer count is written first; the read address is written last and
/// its write starts the data channel.
pub struct DescriptorWindow;

impl DescriptorWindow {
    /// First slot written (transfer count, no trigger)
    pub const FIRST: ChannelRegister = ChannelRegister::Al3TransCount;
    /// Last slot written (read address, trigger)
    pub const TRIGGER: ChannelRegister = ChannelRegister::Al3ReadAddrTrig;
}

// =============================================================================
// Controller Trait
// =============================================================================

/// A DMA controller the pipeline can program
pub trait DmaController {
    /// Bus address of a channel register slot
    fn register_address(&self, channel: ChannelId, register: ChannelRegister) -> u32;

    /// Program a channel without starting it.
    ///
    /// Writes read address, write address, transfer count and control through
    /// the non-triggering aliases.
    fn configure(
        &mut self,
        channel: ChannelId,
        config: &ChannelConfig,
        write_addr: u32,
        read_addr: u32,
        transfer_count: u32,
    ) -> ConfigResult<()>;

    /// Start every channel in `mask` simultaneously
    fn start(&mut self, mask: u32);

    /// Current read address of a channel
    fn read_address(&self, channel: ChannelId) -> u32;

    /// Remaining transfers of a channel
    fn transfer_count(&self, channel: ChannelId) -> u32;

    /// Whether the channel is transferring
    fn is_busy(&self, channel: ChannelId) -> bool;

    /// Raw interrupt flag of a channel
    fn completion_flag(&self, channel: ChannelId) -> bool;

    /// Clear the raw interrupt flag of a channel
    fn clear_completion_flag(&mut self, channel: ChannelId);

    /// Route the channel's interrupt flag to the DMA IRQ line
    fn set_completion_interrupt(&mut self, channel: ChannelId, enabled: bool);
}

impl<T: DmaController + ?Sized> DmaController for &mut T {
    fn register_address(&self, channel: ChannelId, register: ChannelRegister) -> u32 {
        (**self).register_address(channel, register)
    }

    fn configure(
        &mut self,
        channel: ChannelId,
        config: &ChannelConfig,
        write_addr: u32,
        read_addr: u32,
        transfer_count: u32,
    ) -> ConfigResult<()> {
        (**self).configure(channel, config, write_addr, read_addr, transfer_count)
    }

    fn start(&mut self, mask: u32) {
        (**self).start(mask);
    }

    fn read_address(&self, channel: ChannelId) -> u32 {
        (**self).read_address(channel)
    }

    fn transfer_count(&self, channel: ChannelId) -> u32 {
        (**self).transfer_count(channel)
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        (**self).is_busy(channel)
    }

    fn completion_flag(&self, channel: ChannelId) -> bool {
        (**self).completion_flag(channel)
    }

    fn clear_completion_flag(&mut self, channel: ChannelId) {
        (**self).clear_completion_flag(channel);
    }

    fn set_completion_interrupt(&mut self, channel: ChannelId, enabled: bool) {
        (**self).set_completion_interrupt(channel, enabled);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
