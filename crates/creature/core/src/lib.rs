//! Creature core of a tile-based game server.
//!
//! `creature-core` owns what happens to a single creature: timed conditions,
//! damage bookkeeping and hit blocking, death and experience distribution,
//! path walking and target following, plus the summon hierarchy. It holds
//! no global state. The host hands every operation a [`SimContext`] carrying
//! the mutable [`World`] (registry, timer queue, positions, death sink) and
//! the read-only oracles in [`Env`]. Scheduled work comes back in through
//! [`dispatch()`].
pub mod combat;
pub mod condition;
pub mod config;
pub mod creature;
pub mod death;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod movement;
pub mod types;
pub mod world;

#[cfg(test)]
mod test_support;

pub use combat::{
    BlockAvailability, BlockChecks, BlockType, DamageLedger, DamageType, HitResolution,
    Immunities, block_hit, drain_health, drain_mana, set_attacked_creature,
};
pub use condition::{
    AddOutcome, Condition, ConditionEffect, ConditionList, ConditionPulse, ConditionType,
    EndReason, MAX_CONDITIONS, StatusModifiers, abort_conditions, add_condition,
    execute_conditions, remove_condition,
};
pub use config::{GameConfig, ViewRange};
pub use creature::{
    Creature, CreatureBehavior, CreatureKind, CreatureSnapshot, CreatureTemplate,
    CreatureTemplateBuilder, GenericBehavior, TemplateBehavior, add_summon, on_think,
    remove_creature, remove_summon, start_thinking,
};
pub use death::{DeathReport, Killers, die, killers};
pub use dispatch::{Reschedule, dispatch};
pub use env::{
    Container, Env, FindPathParams, GameEnv, Item, ItemDefinition, ItemOracle, ItemTypeId,
    LootOracle, MapOracle, OracleError, PathError, PathOracle, PcgRng, RngOracle, RollContext,
    TileView, WalkPath, compute_seed,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use movement::{
    WalkState, event_step_ticks, internal_follow_creature, is_in_range, on_creature_appear,
    on_creature_disappear, on_creature_move, on_tile_update, on_walk, set_follow_creature,
    sleep_ticks, start_auto_walk, step_duration, stop_auto_walk, stop_walk_event,
    validate_walk_path,
};
pub use types::{CreatureId, Direction, LightInfo, Position, ResourceMeter, Tick};
pub use world::{
    CreatureEvent, CreatureRegistry, DeathSink, EventHandle, MoveError, MoveExecutor,
    ScheduleError, Scheduler, SimContext, World,
};
