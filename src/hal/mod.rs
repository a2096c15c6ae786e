//! Hardware Abstraction Layer
//!
//! Seams between the pipeline and the chip:
//!
//! - [`dma`]: channel configuration, register aliases, [`DmaController`]
//! - [`output`]: Output Engine contract, PIO TX FIFOs, pin ranges
//! - [`pool`]: claim/release allocators for chip-wide resources
//! - [`rp2040`]: register backend for the RP2040 (feature `rp2040`)

pub mod dma;
pub mod output;
pub mod pool;
#[cfg(feature = "rp2040")]
#[cfg_attr(docsrs, doc(cfg(feature = "rp2040")))]
pub mod rp2040;

// Re-export commonly used types
pub use dma::{
    ChannelConfig, ChannelId, ChannelRegister, DataSize, DescriptorWindow, DmaController, Pacing,
    RegisterField,
};
pub use output::{OutputEngine, PinRange, PioBlock, PioTxFifo, R2rProgram};
pub use pool::{ChannelPool, PinPool, StateMachinePool};
#[cfg(feature = "rp2040")]
pub use rp2040::Rp2040Dma;
