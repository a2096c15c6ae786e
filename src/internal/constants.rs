//! Centralized Constants
//!
//! Single source of truth for the magic numbers used by the pipeline.
//!
//! # Organization
//!
//! - **Chip resources**: channel, state machine and GPIO counts
//! - **Descriptor layout**: word sizes and ring wrap widths
//! - **Default configuration**: pin assignment of the R2R ladder
//!
//! Register offsets and bit fields live in `internal::register::dma`.

// =============================================================================
// Chip Resources
// =============================================================================

/// Number of DMA channels on the RP2040
pub const DMA_CHANNELS: u8 = 12;

/// Number of PIO blocks on the RP2040
pub const PIO_BLOCKS: u8 = 2;

/// State machines per PIO block
pub const PIO_STATE_MACHINES: u8 = 4;

/// Number of user GPIOs in bank 0 (GPIO0..GPIO29)
pub const USER_GPIO_COUNT: u8 = 30;

/// Maximum width of a PIO `out pins` operation
pub const MAX_OUT_PINS: u8 = 32;

// =============================================================================
// Descriptor Layout
// =============================================================================

/// Size of one bus word moved by either engine
pub const WORD_SIZE: usize = 4;

/// Words per descriptor (transfer count + source address)
pub const DESCRIPTOR_WORDS: u32 = 2;

/// Bytes per descriptor
pub const DESCRIPTOR_SIZE: usize = WORD_SIZE * DESCRIPTOR_WORDS as usize;

/// Write-side ring width of the control engine (log2 of one descriptor)
pub const DESCRIPTOR_WRAP_BITS: u8 = 3;

/// Read-side ring width for a two-descriptor loop (log2 of two descriptors)
pub const LOOP_WRAP_BITS: u8 = 4;

/// Largest ring the CTRL.RING_SIZE field can express
pub const MAX_RING_BITS: u8 = 15;

// =============================================================================
// Default Configuration
// =============================================================================

/// First GPIO of the R2R ladder (GPIO2 keeps the default UART free)
pub const DEFAULT_DATA_BASE: u8 = 2;

/// Resolution of the R2R ladder in bits
pub const DEFAULT_DATA_PINS: u8 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_wrap_matches_descriptor_size() {
        assert_eq!(1usize << DESCRIPTOR_WRAP_BITS, DESCRIPTOR_SIZE);
        assert_eq!(1usize << LOOP_WRAP_BITS, 2 * DESCRIPTOR_SIZE);
    }

    #[test]
    fn default_pins_fit_in_bank0() {
        assert!(DEFAULT_DATA_BASE + DEFAULT_DATA_PINS <= USER_GPIO_COUNT);
    }
}
