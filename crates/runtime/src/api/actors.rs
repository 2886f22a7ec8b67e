//! Requests for new actors entering a running simulation.

use chronicle_core::Tick;

/// Behaviour source attached to a spawned actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Ai,
}

/// Description of an actor to spawn through [`RuntimeHandle::spawn_actor`].
///
/// The actor's first turn is placed `delay` ticks after the time of the last
/// resolved turn.
///
/// [`RuntimeHandle::spawn_actor`]: crate::RuntimeHandle::spawn_actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSpec {
    pub name: String,
    pub kind: ActorKind,
    pub delay: Tick,
}

impl ActorSpec {
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Player,
            delay: Tick::ZERO,
        }
    }

    pub fn ai(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Ai,
            delay: Tick::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Tick) -> Self {
        self.delay = delay;
        self
    }
}
