//! Common error infrastructure for chronicle-core.
//!
//! Domain errors ([`StoreError`](crate::ecs::StoreError),
//! [`TurnError`](crate::engine::TurnError)) live next to the code that raises
//! them. This module holds the shared classification so the runtime can decide
//! how loudly to report a failure without matching every variant.

use crate::state::{EntityId, Tick};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The condition was handled locally; the caller may simply retry.
    Recoverable,

    /// Invalid input or configuration; reject without retry.
    Validation,

    /// The caller broke the scheduler protocol (e.g. `end_turn` with no holder).
    Internal,

    /// Scheduling invariant violated; the simulation cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorContext {
    /// Entity involved in the failure, if any.
    pub actor: Option<EntityId>,

    /// Scheduler `total_time` when the error was raised.
    pub clock: Tick,

    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(clock: Tick) -> Self {
        Self {
            actor: None,
            clock,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: EntityId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(Tick::ZERO)
    }
}

/// Common trait for all chronicle-core errors.
///
/// Gives callers a uniform way to classify a failure, fetch its context, and
/// get a stable identifier for logs and tests.
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for the variant, e.g. `"TURN_NO_HOLDER"`.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl CoreError for crate::ecs::StoreError {
    fn severity(&self) -> ErrorSeverity {
        use crate::ecs::StoreError;
        match self {
            StoreError::EntityNotFound { .. } | StoreError::ComponentNotFound { .. } => {
                ErrorSeverity::Validation
            }
            StoreError::MarkerNotFound { .. } | StoreError::MultipleMarkersFound { .. } => {
                ErrorSeverity::Fatal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use crate::ecs::StoreError;
        match self {
            StoreError::EntityNotFound { .. } => "STORE_ENTITY_NOT_FOUND",
            StoreError::ComponentNotFound { .. } => "STORE_COMPONENT_NOT_FOUND",
            StoreError::MarkerNotFound { .. } => "STORE_MARKER_NOT_FOUND",
            StoreError::MultipleMarkersFound { .. } => "STORE_MULTIPLE_MARKERS_FOUND",
        }
    }
}
