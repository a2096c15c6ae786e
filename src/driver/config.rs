//! Configuration types for the DAC streaming pipeline

use crate::descriptor::ListKind;
use crate::hal::output::{PinRange, R2rProgram};

/// How the descriptor list is replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamVariant {
    /// Walk a terminated list once, then halt
    #[default]
    Finite,
    /// Replay a two-descriptor list forever
    Looping,
    /// Replay one buffer forever
    Single,
}

impl StreamVariant {
    /// Descriptor list kind this variant streams
    #[must_use]
    pub const fn list_kind(self) -> ListKind {
        match self {
            StreamVariant::Finite => ListKind::Terminated,
            StreamVariant::Looping => ListKind::Looping,
            StreamVariant::Single => ListKind::Single,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineConfig {
    /// Replay variant
    pub variant: StreamVariant,
    /// Pins driven by the output program
    pub pins: PinRange,
    /// Give the data channel high bus priority
    pub data_high_priority: bool,
}

impl PipelineConfig {
    /// Finite stream on GPIO2..=GPIO9
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variant: StreamVariant::Finite,
            pins: PinRange::DEFAULT,
            data_high_priority: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the replay variant
    #[must_use]
    pub const fn with_variant(mut self, variant: StreamVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the output pin range
    #[must_use]
    pub const fn with_pins(mut self, pins: PinRange) -> Self {
        self.pins = pins;
        self
    }

    /// Set data channel bus priority
    #[must_use]
    pub const fn with_data_high_priority(mut self, high: bool) -> Self {
        self.data_high_priority = high;
        self
    }

    /// Output program for the configured pins
    #[must_use]
    pub const fn program(&self) -> R2rProgram {
        R2rProgram::new(self.pins)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineState {
    /// Engines not yet armed
    #[default]
    Idle,
    /// Both engines armed, start trigger not issued
    Armed,
    /// Streaming the descriptor at this index
    Streaming(usize),
    /// Sentinel loaded, completion flag set
    Halted,
}

impl PipelineState {
    /// Whether the hardware may still be moving data
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, PipelineState::Streaming(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pins_match_r2r_board() {
        let config = PipelineConfig::default();
        assert_eq!(config.pins.base(), 2);
        assert_eq!(config.pins.count(), 8);
        assert_eq!(config.variant, StreamVariant::Finite);
        assert!(!config.data_high_priority);
    }

    #[test]
    fn builder_overrides() {
        let pins = PinRange::new(10, 4).unwrap();
        let config = PipelineConfig::new()
            .with_variant(StreamVariant::Single)
            .with_pins(pins)
            .with_data_high_priority(true);
        assert_eq!(config.variant, StreamVariant::Single);
        assert_eq!(config.pins, pins);
        assert!(config.data_high_priority);
        assert_eq!(config.program().pins(), pins);
    }

    #[test]
    fn variants_map_to_list_kinds() {
        assert_eq!(StreamVariant::Finite.list_kind(), ListKind::Terminated);
        assert_eq!(StreamVariant::Looping.list_kind(), ListKind::Looping);
        assert_eq!(StreamVariant::Single.list_kind(), ListKind::Single);
    }

    #[test]
    fn only_streaming_is_running() {
        assert!(PipelineState::Streaming(3).is_running());
        assert!(!PipelineState::Armed.is_running());
        assert!(!PipelineState::Halted.is_running());
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }
}
