//! Asynchronous abstraction for sourcing player and NPC decisions.
//!
//! The scheduler never decides what an actor does. It only needs to know how
//! much time the chosen action consumed. Runtime users plug in
//! [`ActionProvider`] implementations for human input, AI policies, or
//! scripted fixtures.
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chronicle_core::{EntityId, Tick, TurnSnapshot};

use super::errors::{ProviderKind, Result, RuntimeError};

/// Decides the current holder's action and reports its time cost.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Returns the time units spent by `entity` on its turn.
    ///
    /// `snapshot` is a read-only copy of the scheduler state taken when the
    /// turn began.
    async fn decide(&self, entity: EntityId, snapshot: &TurnSnapshot) -> Result<Tick>;
}

/// Every turn costs the same amount. Useful as a fallback or in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedCostProvider(pub Tick);

#[async_trait]
impl ActionProvider for FixedCostProvider {
    async fn decide(&self, _entity: EntityId, _snapshot: &TurnSnapshot) -> Result<Tick> {
        Ok(self.0)
    }
}

/// Per-entity costs, e.g. to model actors of different speeds.
#[derive(Debug, Clone)]
pub struct CostTableProvider {
    costs: HashMap<EntityId, Tick>,
    default: Tick,
}

impl CostTableProvider {
    pub fn new(default: Tick) -> Self {
        Self {
            costs: HashMap::new(),
            default,
        }
    }

    pub fn with_cost(mut self, entity: EntityId, cost: Tick) -> Self {
        self.costs.insert(entity, cost);
        self
    }
}

#[async_trait]
impl ActionProvider for CostTableProvider {
    async fn decide(&self, entity: EntityId, _snapshot: &TurnSnapshot) -> Result<Tick> {
        Ok(self.costs.get(&entity).copied().unwrap_or(self.default))
    }
}

/// Replays a fixed sequence of costs, then fails once it runs dry.
#[derive(Debug)]
pub struct ScriptedProvider {
    kind: ProviderKind,
    script: Mutex<VecDeque<Tick>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, script: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            kind,
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|script| script.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn decide(&self, entity: EntityId, _snapshot: &TurnSnapshot) -> Result<Tick> {
        let next = self
            .script
            .lock()
            .map_err(|_| RuntimeError::Provider {
                kind: self.kind,
                message: "script lock poisoned".into(),
            })?
            .pop_front();

        next.ok_or_else(|| RuntimeError::Provider {
            kind: self.kind,
            message: format!("script exhausted before {entity} could act"),
        })
    }
}
