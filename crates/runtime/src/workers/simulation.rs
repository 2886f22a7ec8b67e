//! Simulation worker that owns the authoritative [`World`] and
//! [`TurnScheduler`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives the
//! scheduler, and forwards its notifications onto the [`EventBus`].

use tokio::sync::{mpsc, oneshot};

use chronicle_core::{
    Ai, ComponentStore, EntityId, Name, Player, Tick, TimeOfNextAction, TurnError, TurnEvent,
    TurnScheduler, TurnSnapshot, World,
};
use tracing::{debug, error, info};

use crate::api::{ActorKind, ActorSpec, Result, RuntimeError};
use crate::events::{EventBus, StepEvent};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Select the next holder and advance the clocks.
    NextTurn {
        reply: oneshot::Sender<Result<TurnSnapshot>>,
    },
    /// Charge the current holder for its action.
    EndTurn {
        spent_time: Tick,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only copy of the scheduler state.
    Snapshot {
        reply: oneshot::Sender<TurnSnapshot>,
    },
    /// Create an actor and add it to the queue.
    SpawnActor {
        spec: ActorSpec,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    /// Destroy an entity and drop it from the queue.
    Despawn {
        entity: EntityId,
        reply: oneshot::Sender<bool>,
    },
    /// Discard the queue and rebuild it from the world.
    RebuildQueue {
        reply: oneshot::Sender<Result<EntityId>>,
    },
}

/// Background task that processes scheduling commands.
pub struct SimulationWorker {
    world: World,
    scheduler: TurnScheduler,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    /// Creates a new simulation worker and wires the scheduler's notifier to
    /// the event bus.
    pub fn new(
        world: World,
        mut scheduler: TurnScheduler,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let forward = event_bus.clone();
        scheduler.subscribe(move |event: &TurnEvent| forward.publish(event.clone()));

        Self {
            world,
            scheduler,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Returns once every command sender is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        debug!(target: "runtime::worker", "command channel closed; worker exiting");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::NextTurn { reply } => {
                let _ = reply.send(self.next_turn());
            }
            Command::EndTurn { spent_time, reply } => {
                let _ = reply.send(self.end_turn(spent_time));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.scheduler.snapshot());
            }
            Command::SpawnActor { spec, reply } => {
                let _ = reply.send(self.spawn_actor(spec));
            }
            Command::Despawn { entity, reply } => {
                let _ = reply.send(self.despawn(entity));
            }
            Command::RebuildQueue { reply } => {
                let result = self
                    .scheduler
                    .rebuild_turn_queue(&self.world)
                    .map_err(|error| self.report(error.into()));
                let _ = reply.send(result);
            }
        }
    }

    fn next_turn(&mut self) -> Result<TurnSnapshot> {
        self.scheduler
            .next_turn(&self.world)
            .map_err(|error| self.report(error.into()))?;
        Ok(self.scheduler.snapshot())
    }

    fn end_turn(&mut self, spent_time: Tick) -> Result<()> {
        let entity = self.scheduler.turn_holder();
        self.scheduler
            .end_turn(&mut self.world, spent_time)
            .map_err(|error| self.report(error.into()))?;

        if let Some(entity) = entity {
            self.event_bus.publish(StepEvent {
                entity,
                spent_time,
                total_time: self.scheduler.total_time(),
            });
        }
        Ok(())
    }

    /// Actors join at the current clock plus `spec.delay`, so they can never
    /// be scheduled in the past. A second player is refused.
    fn spawn_actor(&mut self, spec: ActorSpec) -> Result<EntityId> {
        if spec.kind == ActorKind::Player {
            if let Ok(existing) = self.world.find_unique::<Player>() {
                return Err(self.report(RuntimeError::PlayerAlreadySpawned { existing }));
            }
        }

        let builder = self.world.build().with(Name::new(spec.name.clone()));
        let entity = match spec.kind {
            ActorKind::Player => builder.with(Player).id(),
            ActorKind::Ai => builder.with(Ai).id(),
        };

        let Some(ready_at) = self.scheduler.time_of_last_turn().checked_add(spec.delay) else {
            self.world.despawn(entity);
            let error = TurnError::time_overflow(entity, self.scheduler.total_time());
            return Err(self.report(error.into()));
        };
        self.world
            .add_component(entity, TimeOfNextAction::new(ready_at))
            .map_err(TurnError::from)?;

        // Before the first queue build the scheduler picks the entity up
        // from the world on its own.
        if !self.scheduler.queue().is_empty() {
            if let Err(error) = self.scheduler.schedule(&self.world, entity) {
                self.world.despawn(entity);
                return Err(self.report(error.into()));
            }
        }

        info!(
            target: "runtime::worker",
            %entity,
            name = %spec.name,
            kind = ?spec.kind,
            ready_at = %ready_at,
            "actor spawned"
        );
        Ok(entity)
    }

    fn despawn(&mut self, entity: EntityId) -> bool {
        let existed = self.world.despawn(entity);
        self.scheduler.unschedule(entity);
        if existed {
            info!(target: "runtime::worker", %entity, "entity despawned");
        }
        existed
    }

    fn report(&self, error: RuntimeError) -> RuntimeError {
        let name = self
            .scheduler
            .turn_holder()
            .and_then(|holder| self.world.get_component::<Name>(holder).ok())
            .map(|name| name.as_str().to_owned());
        error!(
            target: "runtime::worker",
            error = %error,
            source = ?std::error::Error::source(&error),
            severity = error.severity().as_str(),
            holder = ?name,
            total_time = %self.scheduler.total_time(),
            "scheduler command failed"
        );
        error
    }
}
