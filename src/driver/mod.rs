//! Core pipeline components.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - The self-chaining two-channel pipeline
//!
//! # Example
//!
//! ```ignore
//! use ph_rp2040_dac::driver::{Pipeline, PipelineConfig, StreamVariant};
//!
//! let config = PipelineConfig::new().with_variant(StreamVariant::Single);
//! let mut pipeline = Pipeline::new(dma, control, data, config)?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod pipeline;

// Re-exports for convenience
pub use config::{PipelineConfig, PipelineState, StreamVariant};
pub use error::{
    ClaimError, ClaimResult, ConfigError, ConfigResult, Error, Result, StateError, StateResult,
};
pub use pipeline::Pipeline;
