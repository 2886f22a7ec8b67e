//! Components the scheduler reads from the store.
//!
//! An entity is *schedulable* when it is alive, owns a [`TimeOfNextAction`],
//! and has a behaviour source: either the [`Player`] marker or the [`Ai`]
//! marker.

use super::Tick;

/// Authoritative time at which the owning entity may act next.
///
/// The turn queue only caches this value; whenever the two disagree the
/// component wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfNextAction(pub Tick);

impl TimeOfNextAction {
    pub const fn new(at: Tick) -> Self {
        Self(at)
    }

    #[inline]
    pub const fn tick(self) -> Tick {
        self.0
    }

    /// Pushes the next action back by `spent`. Returns `None` on overflow and
    /// leaves the value untouched.
    pub fn spend(&mut self, spent: Tick) -> Option<Tick> {
        let next = self.0.checked_add(spent)?;
        self.0 = next;
        Some(next)
    }
}

/// Marker for the player-controlled entity. At most one entity may carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player;

/// Marker for an AI-driven behaviour source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ai;

/// Display name, used only for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_moves_time_forward() {
        let mut time = TimeOfNextAction::new(Tick(5));
        assert_eq!(time.spend(Tick(8)), Some(Tick(13)));
        assert_eq!(time.tick(), Tick(13));
    }

    #[test]
    fn spend_overflow_leaves_value_untouched() {
        let mut time = TimeOfNextAction::new(Tick(u64::MAX - 1));
        assert_eq!(time.spend(Tick(2)), None);
        assert_eq!(time.tick(), Tick(u64::MAX - 1));
    }
}
