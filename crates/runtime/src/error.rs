//! Unified error type surfaced by the runtime.
//!
//! Wraps rule violations from the core, channel failures and worker
//! coordination so callers can bubble them up with consistent context.

use battle_core::{BattleError, ErrorSeverity, MutationError, ProxyError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("authority command channel closed")]
    CommandChannelClosed,

    #[error("authority reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("authority task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("replica fell behind the commit stream by {missed} events")]
    ReplicaLagged { missed: u64 },

    #[error("battle is over")]
    BattleOver,
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Mutation(e) => e.severity(),
            Self::Proxy(e) => e.severity(),
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
            // A lagged replica must resynchronise from a snapshot.
            Self::ReplicaLagged { .. } => ErrorSeverity::Internal,
            Self::BattleOver => ErrorSeverity::Validation,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Mutation(e) => e.error_code(),
            Self::Proxy(e) => e.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::ReplicaLagged { .. } => "RUNTIME_REPLICA_LAGGED",
            Self::BattleOver => "RUNTIME_BATTLE_OVER",
        }
    }
}
