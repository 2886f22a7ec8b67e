//! Deterministic turn scheduling over an entity-component store.
//!
//! `chronicle-core` decides which actor acts next, keeps global and per-round
//! time, and tells listeners when control changes hands or a round ends. It
//! performs no I/O and has no global state: each simulation constructs its own
//! [`engine::TurnScheduler`] and passes the store in on every call.
//!
//! - [`ecs`] defines the store contract and the in-memory [`ecs::World`]
//! - [`state`] holds ids, time units and the components the scheduler reads
//! - [`engine`] hosts the queue, clocks, notifier and scheduler
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod state;

pub use config::SchedulerConfig;
pub use ecs::{Component, ComponentStore, EntityBuilder, StoreError, World};
pub use engine::{
    ControlPhase, EventListener, ListenerId, Notifier, RoundClock, TurnError, TurnEvent,
    TurnPhase, TurnQueue, TurnScheduler, TurnSnapshot,
};
pub use error::{CoreError, ErrorContext, ErrorSeverity};
pub use state::{Ai, EntityId, Name, Player, Tick, TimeOfNextAction};
