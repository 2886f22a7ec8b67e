use crate::state::Tick;

/// Scheduler configuration and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// Time units that make up one round.
    pub time_in_round: Tick,

    /// When set, a world without a [`Player`](crate::state::Player) entity is
    /// a fatal configuration error. AI-only simulations clear it.
    pub require_player: bool,
}

impl SchedulerConfig {
    pub const DEFAULT_TIME_IN_ROUND: Tick = Tick(100);

    pub const fn new() -> Self {
        Self {
            time_in_round: Self::DEFAULT_TIME_IN_ROUND,
            require_player: true,
        }
    }

    pub const fn with_time_in_round(mut self, time_in_round: Tick) -> Self {
        self.time_in_round = time_in_round;
        self
    }

    pub const fn with_require_player(mut self, require_player: bool) -> Self {
        self.require_player = require_player;
        self
    }

    /// Rejects settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), crate::engine::TurnError> {
        if self.time_in_round == Tick::ZERO {
            return Err(crate::engine::TurnError::InvalidConfig {
                reason: "time_in_round must be greater than zero",
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
