//! Error types for the DMA pipeline
//!
//! Every error is a setup-time failure: once the pipeline streams, the
//! hardware has no failure mode it can report. Errors are organized by domain:
//! - [`ConfigError`]: invalid engine or descriptor configuration
//! - [`ClaimError`]: a hardware resource could not be claimed
//! - [`StateError`]: an operation was issued in the wrong pipeline state
//!
//! The unified [`Error`] enum wraps all domain errors.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration errors caught before the pipeline starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Ring wrap width does not match the descriptor field size
    WrapMismatch,
    /// Descriptor list is not aligned to its ring boundary
    UnalignedList,
    /// Control and data channel are the same channel
    ChannelConflict,
    /// Channel index outside the controller's range
    InvalidChannel,
    /// Pin range is empty, too wide or outside bank 0
    InvalidPinRange,
    /// Descriptor list capacity exceeded while building
    ListFull,
    /// The controller cannot wrap both read and write addresses
    RingUnsupported,
    /// Descriptor list kind differs from the configured stream variant
    KindMismatch,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::WrapMismatch => "ring wrap does not match descriptor size",
            ConfigError::UnalignedList => "descriptor list not aligned to ring",
            ConfigError::ChannelConflict => "control and data channel are identical",
            ConfigError::InvalidChannel => "invalid DMA channel",
            ConfigError::InvalidPinRange => "invalid pin range",
            ConfigError::ListFull => "descriptor list full",
            ConfigError::RingUnsupported => "read and write rings not supported together",
            ConfigError::KindMismatch => "descriptor list kind does not match stream variant",
        }
    }
}

// =============================================================================
// Claim Errors
// =============================================================================

/// Resource claim errors
///
/// Returned when a shared hardware resource is exhausted or already owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimError {
    /// All DMA channels are claimed
    NoFreeChannel,
    /// The requested DMA channel is already claimed
    ChannelInUse,
    /// All PIO state machines are claimed
    NoFreeStateMachine,
    /// The requested state machine is already claimed
    StateMachineInUse,
    /// At least one pin of the range is already claimed
    PinRangeInUse,
    /// Released resource was not claimed
    NotClaimed,
}

impl core::fmt::Display for ClaimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ClaimError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClaimError::NoFreeChannel => "no free DMA channel",
            ClaimError::ChannelInUse => "DMA channel already claimed",
            ClaimError::NoFreeStateMachine => "no free PIO state machine",
            ClaimError::StateMachineInUse => "PIO state machine already claimed",
            ClaimError::PinRangeInUse => "pin range already claimed",
            ClaimError::NotClaimed => "resource not claimed",
        }
    }
}

// =============================================================================
// State Errors
// =============================================================================

/// Pipeline state errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateError {
    /// Engines must be armed before starting
    NotArmed,
    /// The start trigger was already issued
    AlreadyStarted,
    /// Operation requires a stopped (idle or halted) pipeline
    Busy,
}

impl core::fmt::Display for StateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StateError::NotArmed => "pipeline not armed",
            StateError::AlreadyStarted => "pipeline already started",
            StateError::Busy => "pipeline is streaming",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match pipeline.start() {
///     Err(Error::State(StateError::NotArmed)) => { /* arm first */ }
///     Err(Error::Config(ConfigError::WrapMismatch)) => { /* fix layout */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Resource claim error
    Claim(ClaimError),
    /// Pipeline state error
    State(StateError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Claim(e) => write!(f, "claim: {}", e.as_str()),
            Error::State(e) => write!(f, "state: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ClaimError> for Error {
    fn from(e: ClaimError) -> Self {
        Error::Claim(e)
    }
}

impl From<StateError> for Error {
    fn from(e: StateError) -> Self {
        Error::State(e)
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for resource claims
pub type ClaimResult<T> = core::result::Result<T, ClaimError>;

/// Result type alias for state transitions
pub type StateResult<T> = core::result::Result<T, StateError>;

// =============================================================================
// Unit Tests
// =============================================================================
