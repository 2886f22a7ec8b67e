//! Event payloads carried on the bus.

use chronicle_core::{EntityId, Tick};
use serde::{Deserialize, Serialize};

/// Emitted once per completed `end_turn`, for event logs and replay tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Entity whose turn ended.
    pub entity: EntityId,
    /// Time units its action consumed.
    pub spent_time: Tick,
    /// Scheduler clock when the turn ended.
    pub total_time: Tick,
}
