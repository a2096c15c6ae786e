//! Crate-private hardware details.
//!
//! - [`register`]: RP2040 DMA register map and volatile accessors
//! - [`constants`]: chip resource counts, descriptor layout, ladder defaults
//!
//! Nothing here is part of the public API. The few items users may need are
//! re-exported through `crate::constants` and `crate::unsafe_registers`.

pub(crate) mod constants;
pub(crate) mod register;
