//! Unified error types surfaced by the runtime API.
//!
//! Wraps scheduler failures, worker coordination failures, and action
//! provider failures so clients can bubble them up with consistent context.
use std::fmt;

use chronicle_core::{CoreError, EntityId, ErrorSeverity, TurnError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("turn scheduling failed")]
    Turn(#[from] TurnError),

    #[error("a player already exists: {existing}")]
    PlayerAlreadySpawned { existing: EntityId },

    #[error("{kind} action provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("{kind} action provider failed: {message}")]
    Provider { kind: ProviderKind, message: String },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("next_turn completed without a turn holder")]
    MissingTurnHolder,
}

impl RuntimeError {
    /// Severity of the underlying failure. Channel and join failures mean the
    /// worker is gone, which the runtime cannot recover from.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Turn(error) => error.severity(),
            RuntimeError::PlayerAlreadySpawned { .. } | RuntimeError::ProviderNotSet { .. } => {
                ErrorSeverity::Validation
            }
            RuntimeError::Provider { .. } => ErrorSeverity::Recoverable,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::MissingTurnHolder => ErrorSeverity::Fatal,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Player,
    Npc,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Player => "player",
            ProviderKind::Npc => "npc",
        };
        write!(f, "{}", label)
    }
}
