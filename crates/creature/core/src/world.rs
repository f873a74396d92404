//! Mutable world contracts and the context threaded through every operation.
//!
//! The host owns creatures, positions and the timer queue. The creature layer
//! reaches them only through [`World`], handed in explicitly as part of a
//! [`SimContext`]. The host runs each operation to completion before starting
//! the next, so the context is the only access path for the duration of a call.

use std::sync::Arc;

use crate::config::GameConfig;
use crate::creature::{Creature, CreatureBehavior};
use crate::death::DeathReport;
use crate::env::{GameEnv, RollContext, compute_seed};
use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::types::{CreatureId, Direction, Position, Tick};

/// Opaque handle of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventHandle(pub u64);

/// Payload of a scheduled per-creature task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureEvent {
    /// Take the next step of the walk path.
    Walk(CreatureId),
    /// Periodic upkeep: conditions, block flags, follow revalidation.
    Think { creature: CreatureId, interval: u64 },
}

impl CreatureEvent {
    pub fn creature(&self) -> CreatureId {
        match *self {
            CreatureEvent::Walk(creature) => creature,
            CreatureEvent::Think { creature, .. } => creature,
        }
    }
}

/// Entity registry: resolves ids to creatures.
pub trait CreatureRegistry {
    fn creature(&self, id: CreatureId) -> Option<&Creature>;
    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature>;
    /// Every registered creature, in a stable order.
    fn creature_ids(&self) -> Vec<CreatureId>;
}

/// Timer queue.
pub trait Scheduler {
    fn now(&self) -> Tick;

    fn schedule(&mut self, delay: u64, event: CreatureEvent) -> Result<EventHandle, ScheduleError>;

    /// Cancels a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: EventHandle);
}

/// Position bookkeeping and step execution.
pub trait MoveExecutor {
    fn position_of(&self, id: CreatureId) -> Option<Position>;

    /// Moves `id` one step and returns the new position.
    fn move_creature(
        &mut self,
        id: CreatureId,
        direction: Direction,
    ) -> Result<Position, MoveError>;
}

/// Receives finished deaths (corpse placement, removal of the victim).
pub trait DeathSink {
    fn creature_died(&mut self, report: &DeathReport);
}

/// Everything the creature layer needs from the host world.
pub trait World: CreatureRegistry + Scheduler + MoveExecutor + DeathSink {}

impl<T> World for T where T: CreatureRegistry + Scheduler + MoveExecutor + DeathSink {}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduleError {
    #[error("scheduler rejected {event:?}")]
    Rejected {
        event: CreatureEvent,
        context: ErrorContext,
    },

    #[error("scheduler is shut down")]
    Closed,
}

impl GameError for ScheduleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ScheduleError::Rejected { .. } => ErrorSeverity::Recoverable,
            ScheduleError::Closed => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            ScheduleError::Rejected { context, .. } => Some(context),
            ScheduleError::Closed => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ScheduleError::Rejected { .. } => "SCHEDULE_REJECTED",
            ScheduleError::Closed => "SCHEDULE_CLOSED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("creature {0} not found")]
    CreatureNotFound(CreatureId),

    #[error("destination {destination} is blocked")]
    Blocked { destination: Position },

    #[error("destination {destination} is occupied")]
    Occupied { destination: Position },

    #[error("destination {destination} is not a valid tile")]
    Invalid { destination: Position },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MoveError::CreatureNotFound(_) => ErrorSeverity::Validation,
            MoveError::Blocked { .. } | MoveError::Occupied { .. } => ErrorSeverity::Recoverable,
            MoveError::Invalid { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MoveError::CreatureNotFound(_) => "MOVE_CREATURE_NOT_FOUND",
            MoveError::Blocked { .. } => "MOVE_BLOCKED",
            MoveError::Occupied { .. } => "MOVE_OCCUPIED",
            MoveError::Invalid { .. } => "MOVE_INVALID",
        }
    }
}

/// World, oracles and configuration for one run-to-completion operation.
pub struct SimContext<'a> {
    pub world: &'a mut dyn World,
    pub env: GameEnv<'a>,
    pub config: &'a GameConfig,
    pub game_seed: u64,
}

impl<'a> SimContext<'a> {
    pub fn new(world: &'a mut dyn World, env: GameEnv<'a>, config: &'a GameConfig) -> Self {
        Self {
            world,
            env,
            config,
            game_seed: 0,
        }
    }

    pub fn with_seed(mut self, game_seed: u64) -> Self {
        self.game_seed = game_seed;
        self
    }

    pub fn now(&self) -> Tick {
        self.world.now()
    }

    /// Registered creature that has not been removed.
    pub fn live(&self, id: CreatureId) -> Option<&Creature> {
        self.world.creature(id).filter(|creature| !creature.is_removed())
    }

    pub fn is_live(&self, id: CreatureId) -> bool {
        self.live(id).is_some()
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.world.creature_mut(id)
    }

    /// Behavior of `id`, detached from the registry borrow so hooks can take `self`.
    pub fn behavior(&self, id: CreatureId) -> Option<Arc<dyn CreatureBehavior>> {
        self.world.creature(id).map(Creature::behavior)
    }

    /// Percentage roll for `id`, deterministic per game seed, time and purpose.
    ///
    /// Without an rng oracle every roll is 0.
    pub fn roll_percent(&self, id: CreatureId, context: RollContext) -> u32 {
        let seed = compute_seed(self.game_seed, self.now(), id, context);
        self.env
            .rng()
            .map(|rng| rng.roll_percent(seed))
            .unwrap_or(0)
    }

    /// Inclusive range roll for `id`; `min` without an rng oracle.
    pub fn roll_range(&self, id: CreatureId, context: RollContext, min: u32, max: u32) -> u32 {
        let seed = compute_seed(self.game_seed, self.now(), id, context);
        self.env
            .rng()
            .map(|rng| rng.range(seed, min, max))
            .unwrap_or(min)
    }
}
