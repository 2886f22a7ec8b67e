//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! advancing turns or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use chronicle_core::{EntityId, Tick, TurnSnapshot};

use super::actors::ActorSpec;
use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Selects the next turn holder and returns the resulting snapshot.
    pub async fn next_turn(&self) -> Result<TurnSnapshot> {
        self.request(|reply| Command::NextTurn { reply }).await?
    }

    /// Charges the current holder `spent_time` ticks and releases its turn.
    pub async fn end_turn(&self, spent_time: Tick) -> Result<()> {
        self.request(|reply| Command::EndTurn { spent_time, reply })
            .await?
    }

    /// Query the current scheduler state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<TurnSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn spawn_actor(&self, spec: ActorSpec) -> Result<EntityId> {
        self.request(|reply| Command::SpawnActor { spec, reply })
            .await?
    }

    /// Destroys `entity`. Returns `false` if it was already gone.
    pub async fn despawn(&self, entity: EntityId) -> Result<bool> {
        self.request(|reply| Command::Despawn { entity, reply }).await
    }

    /// Discards the turn queue and rebuilds it from the world. Used when the
    /// holder was destroyed before it could act.
    pub async fn rebuild_queue(&self) -> Result<EntityId> {
        self.request(|reply| Command::RebuildQueue { reply }).await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - turn holder changes
    /// - `Topic::Round` - round rollovers
    /// - `Topic::Step` - time charged at the end of each turn
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use chronicle_runtime::Topic;
    ///
    /// let mut rounds = handle.subscribe(Topic::Round);
    /// while let Ok(event) = rounds.recv().await {
    ///     // Handle round rollovers
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
