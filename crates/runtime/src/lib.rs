//! Async runtime around the turn scheduler.
//!
//! Consumers embed [`Runtime`] to drive turns, subscribe to scheduler events,
//! and spawn or destroy actors through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, ActorKind, ActorSpec, CostTableProvider, FixedCostProvider, ProviderKind,
    Result, RuntimeError, RuntimeHandle, ScriptedProvider,
};
pub use events::{Event, EventBus, StepEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
