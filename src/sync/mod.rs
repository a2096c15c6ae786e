//! Synchronization and Concurrency Support
//!
//! This module provides synchronization primitives and ISR-safe wrappers for
//! sharing chip resources. It includes:
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - [`AtomicWaker`] - Async waker storage for interrupts
//!
//! - **Shared Allocators** (`shared`): ISR-safe resource pools
//!   - [`SharedResources`] - DMA channels, state machines and pins behind a
//!     critical section
//!
//! - **Async Support** (`asynch`): Waiting for completion without spinning
//!   - [`CompletionFuture`] - Future returned by `Pipeline::wait_async`
//!   - [`COMPLETION_WAKER`] and the DMA interrupt handler
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables `primitives` and `shared` modules
//! - `async`: Enables `asynch` module (also requires `critical-section`)
//!
//! # Example
//!
//! ```ignore
//! use ph_rp2040_dac::sync::SharedResources;
//!
//! static RESOURCES: SharedResources = SharedResources::new();
//!
//! fn main() {
//!     let res = RESOURCES.claim_pipeline(PinRange::default()).unwrap();
//!     let mut pipeline = Pipeline::new(dma, res.control, res.data, config).unwrap();
//! }
//! ```

// Primitives module (requires critical-section)
mod primitives;

#[cfg(feature = "async")]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

// Shared allocators (requires critical-section)
mod shared;

pub use shared::{PipelineResources, Pools, SharedResources};

// Async support (requires async feature)
#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::{COMPLETION_WAKER, CompletionFuture, completion_interrupt_handler};
