//! DMA Controller Register Definitions
//!
//! Each of the 12 channels owns a 0x40-byte block holding four aliases of the
//! same four registers. Every alias ends in a trigger register; writing it
//! both stores the value and starts the channel.
//!
//! ```text
//!           +0x0        +0x4          +0x8          +0xC (Trigger)
//! Alias 0:  READ_ADDR   WRITE_ADDR    TRANS_COUNT   CTRL_TRIG
//! Alias 1:  CTRL        READ_ADDR     WRITE_ADDR    TRANS_COUNT_TRIG
//! Alias 2:  CTRL        TRANS_COUNT   READ_ADDR     WRITE_ADDR_TRIG
//! Alias 3:  CTRL        WRITE_ADDR    TRANS_COUNT   READ_ADDR_TRIG
//! ```

use super::{DMA_BASE, chan_reg_rw, reg_rw, reg_wo};

// =============================================================================
// Register Offsets
// =============================================================================

/// Stride between consecutive channel register blocks
pub const CHANNEL_STRIDE: usize = 0x40;

/// Alias 0: read address
pub const READ_ADDR_OFFSET: usize = 0x00;
/// Alias 0: write address
pub const WRITE_ADDR_OFFSET: usize = 0x04;
/// Alias 0: transfer count
pub const TRANS_COUNT_OFFSET: usize = 0x08;
/// Alias 0: control, trigger
pub const CTRL_TRIG_OFFSET: usize = 0x0C;
/// Alias 1: control (no trigger)
pub const AL1_CTRL_OFFSET: usize = 0x10;
/// Alias 1: read address
pub const AL1_READ_ADDR_OFFSET: usize = 0x14;
/// Alias 1: write address
pub const AL1_WRITE_ADDR_OFFSET: usize = 0x18;
/// Alias 1: transfer count, trigger
pub const AL1_TRANS_COUNT_TRIG_OFFSET: usize = 0x1C;
/// Alias 2: control
pub const AL2_CTRL_OFFSET: usize = 0x20;
/// Alias 2: transfer count
pub const AL2_TRANS_COUNT_OFFSET: usize = 0x24;
/// Alias 2: read address
pub const AL2_READ_ADDR_OFFSET: usize = 0x28;
/// Alias 2: write address, trigger
pub const AL2_WRITE_ADDR_TRIG_OFFSET: usize = 0x2C;
/// Alias 3: control
pub const AL3_CTRL_OFFSET: usize = 0x30;
/// Alias 3: write address
pub const AL3_WRITE_ADDR_OFFSET: usize = 0x34;
/// Alias 3: transfer count
pub const AL3_TRANS_COUNT_OFFSET: usize = 0x38;
/// Alias 3: read address, trigger
pub const AL3_READ_ADDR_TRIG_OFFSET: usize = 0x3C;

/// Raw interrupt status (one bit per channel, write 1 to clear)
pub const INTR_OFFSET: usize = 0x400;
/// IRQ 0 enable
pub const INTE0_OFFSET: usize = 0x404;
/// IRQ 0 status after masking (write 1 to clear)
pub const INTS0_OFFSET: usize = 0x40C;
/// Start several channels at once (one bit per channel)
pub const MULTI_CHAN_TRIGGER_OFFSET: usize = 0x430;

/// Size of the DMA register window decoded by the controller
pub const DMA_WINDOW_SIZE: usize = 0x800;

// =============================================================================
// CTRL Register Bits
// =============================================================================

/// Channel enable
pub const CTRL_EN: u32 = 1 << 0;
/// Prioritise this channel in the bus arbiter
pub const CTRL_HIGH_PRIORITY: u32 = 1 << 1;
/// Transfer size shift (0 = byte, 1 = halfword, 2 = word)
pub const CTRL_DATA_SIZE_SHIFT: u32 = 2;
/// Transfer size mask
pub const CTRL_DATA_SIZE_MASK: u32 = 0x3 << 2;
/// Increment read address after each transfer
pub const CTRL_INCR_READ: u32 = 1 << 4;
/// Increment write address after each transfer
pub const CTRL_INCR_WRITE: u32 = 1 << 5;
/// Ring size shift (log2 of the wrap boundary in bytes, 0 = no ring)
pub const CTRL_RING_SIZE_SHIFT: u32 = 6;
/// Ring size mask
pub const CTRL_RING_SIZE_MASK: u32 = 0xF << 6;
/// Apply the ring to write addresses instead of read addresses
pub const CTRL_RING_SEL: u32 = 1 << 10;
/// Chain target shift (chaining to self disables chaining)
pub const CTRL_CHAIN_TO_SHIFT: u32 = 11;
/// Chain target mask
pub const CTRL_CHAIN_TO_MASK: u32 = 0xF << 11;
/// Transfer request select shift
pub const CTRL_TREQ_SEL_SHIFT: u32 = 15;
/// Transfer request select mask
pub const CTRL_TREQ_SEL_MASK: u32 = 0x3F << 15;
/// Only raise the channel interrupt on a null trigger
pub const CTRL_IRQ_QUIET: u32 = 1 << 21;
/// Channel is actively transferring (read-only)
pub const CTRL_BUSY: u32 = 1 << 24;

/// TREQ_SEL value for an unpaced channel
pub const TREQ_PERMANENT: u32 = 0x3F;

// =============================================================================
// Register Accessors
// =============================================================================

/// Register accessor for the DMA block
pub struct DmaRegs;

impl DmaRegs {
    /// Base address of a channel's register block
    #[inline(always)]
    pub const fn channel_base(channel: u8) -> usize {
        DMA_BASE + channel as usize * CHANNEL_STRIDE
    }

    chan_reg_rw!(read_addr, set_read_addr, READ_ADDR_OFFSET, "channel read address");
    chan_reg_rw!(write_addr, set_write_addr, WRITE_ADDR_OFFSET, "channel write address");
    chan_reg_rw!(trans_count, set_trans_count, TRANS_COUNT_OFFSET, "channel transfer count");
    chan_reg_rw!(ctrl, set_ctrl_no_trigger, AL1_CTRL_OFFSET, "channel control (alias 1)");

    reg_rw!(intr, set_intr, DMA_BASE, INTR_OFFSET, "raw interrupt status");
    reg_rw!(inte0, set_inte0, DMA_BASE, INTE0_OFFSET, "IRQ 0 enable mask");
    reg_rw!(ints0, set_ints0, DMA_BASE, INTS0_OFFSET, "IRQ 0 masked status");
    reg_wo!(multi_chan_trigger, DMA_BASE, MULTI_CHAN_TRIGGER_OFFSET, "multi-channel trigger");
}
