//! Memory-mapped register definitions for the RP2040 DMA block
//!
//! This module provides volatile access to the DMA controller registers.
//! Peripheral base addresses live here; per-block offsets and bit fields live
//! in the submodules.

pub mod dma;

/// DMA register block base address
pub const DMA_BASE: usize = 0x5000_0000;

/// PIO0 register block base address
pub const PIO0_BASE: usize = 0x5020_0000;

/// PIO1 register block base address
pub const PIO1_BASE: usize = 0x5030_0000;

/// Start of striped SRAM
pub const SRAM_BASE: usize = 0x2000_0000;

/// Offset of TXF0 within a PIO block (TXF1..3 follow at 4-byte steps)
pub const PIO_TXF0_OFFSET: usize = 0x10;

/// Volatile 32-bit load from a peripheral register
///
/// # Safety
/// `addr` must be a word-aligned, mapped register address.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Volatile 32-bit store to a peripheral register
///
/// # Safety
/// `addr` must be a word-aligned, mapped register address.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a global register.
///
/// # Example
/// ```ignore
/// impl DmaRegs {
///     reg_rw!(inte0, set_inte0, DMA_BASE, INTE0_OFFSET, "IRQ 0 enable register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $base:expr, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn() -> u32 {
            unsafe { $crate::internal::register::read_reg($base + $offset) }
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(value: u32) {
            unsafe { $crate::internal::register::write_reg($base + $offset, value) }
        }
    };
}

/// Generate a write-only accessor method for a global register.
macro_rules! reg_wo {
    ($write_fn:ident, $base:expr, $offset:expr, $doc:expr) => {
        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(value: u32) {
            unsafe { $crate::internal::register::write_reg($base + $offset, value) }
        }
    };
}

/// Generate read/write accessor methods for a per-channel register.
///
/// The channel index is masked by the caller; the accessor only adds the
/// channel stride.
macro_rules! chan_reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(channel: u8) -> u32 {
            unsafe { $crate::internal::register::read_reg(Self::channel_base(channel) + $offset) }
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(channel: u8, value: u32) {
            unsafe {
                $crate::internal::register::write_reg(Self::channel_base(channel) + $offset, value)
            }
        }
    };
}

pub(crate) use chan_reg_rw;
pub(crate) use reg_rw;
pub(crate) use reg_wo;
