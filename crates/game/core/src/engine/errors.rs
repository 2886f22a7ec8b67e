//! Error types for turn scheduling.

use crate::ecs::StoreError;
use crate::error::{CoreError, ErrorContext, ErrorSeverity};
use crate::state::{EntityId, Tick};

/// Errors surfaced by [`TurnScheduler`](super::TurnScheduler).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// `end_turn` was called while nobody holds the turn.
    #[error("no entity currently holds the turn")]
    NoTurnHolder { context: ErrorContext },

    /// The store contains no schedulable entity.
    #[error("no schedulable entities; the simulation cannot make progress")]
    EmptySchedule { context: ErrorContext },

    /// The selected entity is ready before the clock's last turn.
    #[error(
        "time would run backwards: {entity} is ready at {ready_at} but the last turn was at {time_of_last_turn}"
    )]
    NegativeTimeProgression {
        entity: EntityId,
        ready_at: Tick,
        time_of_last_turn: Tick,
        context: ErrorContext,
    },

    /// Adding spent time to an entity's schedule overflowed.
    #[error("time of next action for {entity} overflowed")]
    TimeOverflow {
        entity: EntityId,
        context: ErrorContext,
    },

    /// The entity has no behaviour source or no time of next action.
    #[error("{entity} is not schedulable")]
    NotSchedulable {
        entity: EntityId,
        context: ErrorContext,
    },

    #[error("invalid scheduler configuration: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TurnError {
    pub fn no_turn_holder(clock: Tick) -> Self {
        Self::NoTurnHolder {
            context: ErrorContext::new(clock).with_message("end_turn requires an active holder"),
        }
    }

    pub fn empty_schedule(clock: Tick) -> Self {
        Self::EmptySchedule {
            context: ErrorContext::new(clock).with_message("turn queue build failed"),
        }
    }

    pub fn negative_time_progression(
        entity: EntityId,
        ready_at: Tick,
        time_of_last_turn: Tick,
        clock: Tick,
    ) -> Self {
        Self::NegativeTimeProgression {
            entity,
            ready_at,
            time_of_last_turn,
            context: ErrorContext::new(clock).with_actor(entity),
        }
    }

    pub fn time_overflow(entity: EntityId, clock: Tick) -> Self {
        Self::TimeOverflow {
            entity,
            context: ErrorContext::new(clock).with_actor(entity),
        }
    }

    pub fn not_schedulable(entity: EntityId, clock: Tick) -> Self {
        Self::NotSchedulable {
            entity,
            context: ErrorContext::new(clock)
                .with_actor(entity)
                .with_message("entity needs a behaviour source and a time of next action"),
        }
    }
}

impl CoreError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoTurnHolder { .. } => ErrorSeverity::Internal,
            Self::NotSchedulable { .. } | Self::InvalidConfig { .. } => ErrorSeverity::Validation,
            Self::EmptySchedule { .. }
            | Self::NegativeTimeProgression { .. }
            | Self::TimeOverflow { .. } => ErrorSeverity::Fatal,
            Self::Store(error) => error.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::NoTurnHolder { context }
            | Self::EmptySchedule { context }
            | Self::NegativeTimeProgression { context, .. }
            | Self::TimeOverflow { context, .. }
            | Self::NotSchedulable { context, .. } => Some(context),
            Self::InvalidConfig { .. } | Self::Store(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoTurnHolder { .. } => "TURN_NO_HOLDER",
            Self::EmptySchedule { .. } => "TURN_EMPTY_SCHEDULE",
            Self::NegativeTimeProgression { .. } => "TURN_NEGATIVE_TIME_PROGRESSION",
            Self::TimeOverflow { .. } => "TURN_TIME_OVERFLOW",
            Self::NotSchedulable { .. } => "TURN_NOT_SCHEDULABLE",
            Self::InvalidConfig { .. } => "TURN_INVALID_CONFIG",
            Self::Store(error) => error.error_code(),
        }
    }
}
