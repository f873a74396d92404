//! Common error infrastructure for creature-core.
//!
//! Domain-specific errors (`MoveError`, `PathError`, `ScheduleError`,
//! `OracleError`) live next to the contracts that produce them. Target
//! vanishing, blocked steps and missing paths are ordinary outcomes and are
//! returned as values; nothing in the crate unwinds for control flow.

use crate::types::{CreatureId, Position, Tick};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying later (next step, next think) may succeed.
    ///
    /// Examples: destination blocked, scheduler busy
    Recoverable,

    /// Invalid input that should not be retried unchanged.
    ///
    /// Examples: creature not found, no path to target
    Validation,

    /// Unexpected state inconsistency; indicates a bug.
    Internal,

    /// The host is misconfigured and the simulation cannot continue.
    ///
    /// Examples: missing required oracle
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Creature that triggered the error (if applicable).
    pub creature: Option<CreatureId>,

    /// Position where the error occurred (if applicable).
    pub position: Option<Position>,

    /// Scheduler time at which the error occurred.
    pub at: Tick,

    /// Optional static message providing additional context.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(at: Tick) -> Self {
        Self {
            creature: None,
            position: None,
            at,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_creature(mut self, creature: CreatureId) -> Self {
        self.creature = Some(creature);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all creature-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
