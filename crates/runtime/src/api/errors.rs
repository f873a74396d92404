//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, configuration and the creature
//! core so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use creature_core::{CreatureId, GameError, MoveError, OracleError, Position, ScheduleError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error("creature {0} does not exist or was removed")]
    UnknownCreature(CreatureId),

    #[error("cannot place a creature at {0}")]
    InvalidPosition(Position),

    #[error("{0} cannot become a summon of {1}")]
    InvalidSummon(CreatureId, CreatureId),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl RuntimeError {
    /// Stable code for logs and clients; core errors keep their own code.
    pub fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::MissingOracles => "RUNTIME_MISSING_ORACLES",
            RuntimeError::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
            RuntimeError::UnknownCreature(_) => "RUNTIME_UNKNOWN_CREATURE",
            RuntimeError::InvalidPosition(_) => "RUNTIME_INVALID_POSITION",
            RuntimeError::InvalidSummon(..) => "RUNTIME_INVALID_SUMMON",
            RuntimeError::Schedule(error) => error.error_code(),
            RuntimeError::Move(error) => error.error_code(),
            RuntimeError::Oracle(error) => error.error_code(),
        }
    }
}
