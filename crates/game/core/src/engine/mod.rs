//! Turn scheduling.
//!
//! [`TurnScheduler`] decides who acts next. It keeps a [`TurnQueue`] of cached
//! times, a [`RoundClock`] for global and per-round time, and a [`Notifier`]
//! for lifecycle events. The authoritative time of every actor stays on its
//! [`TimeOfNextAction`](crate::state::TimeOfNextAction) component.

mod clock;
mod errors;
mod events;
mod queue;
mod turns;

pub use clock::RoundClock;
pub use errors::TurnError;
pub use events::{EventListener, ListenerId, Notifier, TurnEvent};
pub use queue::TurnQueue;
pub use turns::TurnScheduler;

use crate::state::{EntityId, Tick};

/// Lifecycle of the scheduler.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIs,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnPhase {
    /// No queue has been built yet.
    Uninitialised,
    /// A holder has control.
    Active,
    /// The last holder's turn ended; waiting for `next_turn`.
    Resolving,
}

/// Macro-phase announced to listeners: whose side is acting.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIs,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlPhase {
    PlayerTurn,
    EnemyTurn,
}

impl ControlPhase {
    pub const fn for_holder(is_player: bool) -> Self {
        if is_player {
            Self::PlayerTurn
        } else {
            Self::EnemyTurn
        }
    }
}

/// Point-in-time copy of the scheduler's observable state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnSnapshot {
    pub holder: Option<EntityId>,
    pub holder_is_player: bool,
    pub phase: TurnPhase,
    pub total_time: Tick,
    pub time_of_last_turn: Tick,
    pub round_time: Tick,
    pub round_count: u64,
    pub time_in_round: Tick,
    /// Queue entries in selection order.
    pub queue: Vec<(EntityId, Tick)>,
}
