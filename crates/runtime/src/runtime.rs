//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the turn loop.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chronicle_core::{SchedulerConfig, TurnScheduler, TurnSnapshot, World};
use tracing::debug;

use crate::api::{ActionProvider, ProviderKind, Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub scheduler: SchedulerConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that drives the turn loop.
///
/// Runtime owns the worker and asks the providers for each actor's action.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,

    player_provider: Option<Box<dyn ActionProvider>>,
    npc_provider: Option<Box<dyn ActionProvider>>,

    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Execute a single turn step.
    ///
    /// Makes sure someone holds the turn, asks the matching provider how long
    /// the holder's action takes, charges it, and hands control to the next
    /// actor. Returns the snapshot after the hand-over.
    pub async fn step(&mut self) -> Result<TurnSnapshot> {
        let mut snapshot = self.handle.snapshot().await?;
        if snapshot.holder.is_none() {
            snapshot = self.handle.next_turn().await?;
        }

        let entity = snapshot.holder.ok_or(RuntimeError::MissingTurnHolder)?;
        let kind = if snapshot.holder_is_player {
            ProviderKind::Player
        } else {
            ProviderKind::Npc
        };
        let provider = match kind {
            ProviderKind::Player => self.player_provider.as_ref(),
            ProviderKind::Npc => self.npc_provider.as_ref(),
        }
        .ok_or(RuntimeError::ProviderNotSet { kind })?;

        let spent_time = provider.decide(entity, &snapshot).await?;
        debug!(
            target: "runtime::step",
            %entity,
            %kind,
            spent_time = %spent_time,
            "action decided"
        );

        self.handle.end_turn(spent_time).await?;
        self.handle.next_turn().await
    }

    /// Run `steps` turn steps, stopping at the first error.
    pub async fn run(&mut self, steps: usize) -> Result<TurnSnapshot> {
        let mut last = self.handle.snapshot().await?;
        for _ in 0..steps {
            last = self.step().await?;
        }
        Ok(last)
    }

    /// Set the player action provider
    pub fn set_player_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.player_provider = Some(Box::new(provider));
    }

    /// Set the NPC action provider
    pub fn set_npc_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.npc_provider = Some(Box::new(provider));
    }

    /// Shutdown the runtime gracefully.
    ///
    /// Clones of the handle held elsewhere keep the worker alive, so drop them
    /// first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    player_provider: Option<Box<dyn ActionProvider>>,
    npc_provider: Option<Box<dyn ActionProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            player_provider: None,
            npc_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the initial world. Defaults to an empty one.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Set player action provider (optional)
    pub fn player_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.player_provider = Some(Box::new(provider));
        self
    }

    /// Set NPC action provider (optional)
    pub fn npc_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.npc_provider = Some(Box::new(provider));
        self
    }

    /// Build the runtime and spawn the simulation worker.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let scheduler = TurnScheduler::new(self.config.scheduler)?;
        let world = self.world.unwrap_or_default();

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());
        let sim_worker = SimulationWorker::new(world, scheduler, command_rx, event_bus);

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            player_provider: self.player_provider,
            npc_provider: self.npc_provider,
            sim_worker_handle,
        })
    }
}
