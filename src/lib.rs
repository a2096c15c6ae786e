//! RP2040 Self-Chaining DMA Waveform Pipeline
//!
//! A `no_std`, `no_alloc` driver that streams sample buffers from SRAM to an
//! R2R resistor-ladder DAC through a PIO state machine, with no CPU work
//! between buffers.
//!
//! Two DMA channels cooperate. The *data* channel copies samples into the
//! PIO TX FIFO, paced by the FIFO's DREQ. When its count runs out it chains
//! to the *control* channel, which copies the next descriptor
//! `{transfer_count, source}` into the data channel's alias-3 registers.
//! Writing the read address lands on the trigger slot and restarts the data
//! channel. A `{0, 0}` sentinel is a null trigger: the data channel stays
//! idle and raises its completion flag.
//!
//! # Architecture
//!
//! The driver is organized into layers:
//!
//! 1. **Descriptor Layer** ([`descriptor`]): Descriptor lists and their
//!    memory layout
//! 2. **Driver Layer** ([`driver`]): The [`Pipeline`], its configuration and
//!    state machine
//! 3. **HAL Layer** ([`hal`]): DMA controller abstraction, PIO output
//!    resources and resource pools
//!
//! # Stream Variants
//!
//! - [`StreamVariant::Finite`]: a sentinel-terminated list played once
//! - [`StreamVariant::Looping`]: a two-entry list replayed through a read
//!   ring on the control channel
//! - [`StreamVariant::Single`]: one buffer replayed forever by re-triggering
//!   the data channel's read address
//!
//! The RP2040 DMA offers one address ring per channel, so
//! [`StreamVariant::Looping`] is rejected by [`hal::Rp2040Dma`] with
//! [`ConfigError::RingUnsupported`]. It runs on the simulator.
//!
//! # Features
//!
//! - `rp2040` (default): RP2040 register backend
//! - `defmt`: Enable defmt formatting and pipeline event logging
//! - `log`: Diagnostics through the `log` facade
//! - `critical-section`: Enable ISR-safe `SharedResources` allocators
//! - `async`: Enable async completion wait with wakers
//! - `sim`: Host-side DMA/PIO simulator
//!
//! # Example
//!
//! ```ignore
//! use ph_rp2040_dac::{Descriptor, DescriptorList, Pipeline, PipelineConfig};
//! use ph_rp2040_dac::hal::{PioBlock, PioTxFifo, Rp2040Dma};
//!
//! static SAMPLES: [u32; 64] = [0; 64];
//! static LIST: DescriptorList<1> = DescriptorList::single(SAMPLES.as_ptr() as u32, 64);
//!
//! let dma = unsafe { Rp2040Dma::steal() };
//! let control = ChannelId::new(0)?;
//! let data = ChannelId::new(1)?;
//! let config = PipelineConfig::new().with_variant(StreamVariant::Single);
//!
//! let mut pipeline = Pipeline::new(dma, control, data, config)?;
//! let output = PioTxFifo::new(PioBlock::Pio0, 0)?;
//! pipeline.arm(&LIST.layout()?, &output)?;
//! pipeline.start()?;
//! ```
//!
//! # Memory Requirements
//!
//! - Looping lists: 16-byte alignment (two descriptors inside a 16-byte
//!   read ring)
//! - Other lists: word alignment
//! - Sample buffers: word alignment, one `u32` per sample

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod descriptor;
pub mod driver;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(any(test, feature = "sim"))]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub mod sim;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use descriptor::{Descriptor, DescriptorList, DescriptorListBuilder, ListKind, ListLayout};
pub use driver::config::{PipelineConfig, PipelineState, StreamVariant};
pub use driver::error::{
    ClaimError, ClaimResult, ConfigError, ConfigResult, Error, Result, StateError, StateResult,
};
pub use driver::pipeline::Pipeline;
pub use hal::dma::{ChannelConfig, ChannelId, DataSize, DmaController, Pacing};
pub use hal::output::{OutputEngine, PinRange, PioBlock, PioTxFifo, R2rProgram};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe pipeline API instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Reprogramming a channel
/// the pipeline owns corrupts the chain.
pub mod unsafe_registers {
    pub use crate::internal::register::dma::DmaRegs;
}

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedResources;

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::asynch::{CompletionFuture, completion_interrupt_handler};

/// Shared hardware constants.
pub mod constants {
    pub use crate::internal::constants::{
        // Descriptors
        DESCRIPTOR_SIZE,
        DESCRIPTOR_WORDS,
        DESCRIPTOR_WRAP_BITS,
        LOOP_WRAP_BITS,
        // Chip resources
        DMA_CHANNELS,
        PIO_BLOCKS,
        PIO_STATE_MACHINES,
        USER_GPIO_COUNT,
        // Output defaults
        DEFAULT_DATA_BASE,
        DEFAULT_DATA_PINS,
        MAX_OUT_PINS,
        MAX_RING_BITS,
        WORD_SIZE,
    };
}
