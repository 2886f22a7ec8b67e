//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chronicle_core::TurnEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::StepEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Control passed between player and AI
    Turn,
    /// Round boundaries
    Round,
    /// Completed turns with their cost
    Step,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Turn(TurnEvent),
    Step(StepEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(TurnEvent::TurnHolderChanged { .. }) => Topic::Turn,
            Event::Turn(TurnEvent::RoundEnded { .. }) => Topic::Round,
            Event::Step(_) => Topic::Step,
        }
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<StepEvent> for Event {
    fn from(event: StepEvent) -> Self {
        Event::Step(event)
    }
}

struct Channels {
    turn: broadcast::Sender<Event>,
    round: broadcast::Sender<Event>,
    step: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Round => &self.round,
            Topic::Step => &self.step,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels for every topic exist from construction,
/// so subscribing can never fail.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                turn: broadcast::channel(capacity).0,
                round: broadcast::channel(capacity).0,
                step: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
