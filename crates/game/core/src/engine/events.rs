//! Turn lifecycle notifications.
//!
//! The scheduler publishes through its own [`Notifier`]; listeners are plain
//! callbacks registered on the scheduler instance, so there is no process-wide
//! hub. Events describing one transition are buffered and delivered after the
//! scheduler has committed that transition.

use crate::state::EntityId;

/// Notification emitted by the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnEvent {
    /// Control passed to `entity`. Consecutive AI turns are folded into a
    /// single notification until the player acts again.
    TurnHolderChanged { entity: EntityId, is_player: bool },

    /// Round `round_count` (zero-based) has ended.
    RoundEnded { round_count: u64 },
}

/// Receives scheduler notifications.
///
/// Listeners only see the event. They cannot reach back into the scheduler
/// while it is mid-transition, because the scheduler is exclusively borrowed
/// for the whole call.
pub trait EventListener: Send {
    fn on_event(&mut self, event: &TurnEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&TurnEvent) + Send,
{
    fn on_event(&mut self, event: &TurnEvent) {
        self(event)
    }
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered fan-out to registered listeners.
#[derive(Default)]
pub struct Notifier {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn EventListener>)>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners are called in registration order.
    pub fn subscribe(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Delivers every event, in order, to every listener.
    pub fn publish(&mut self, events: &[TurnEvent]) {
        for event in events {
            tracing::trace!(target: "chronicle::events", ?event, "publishing");
            for (_, listener) in &mut self.listeners {
                listener.on_event(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
