//! Movement controller: walk queue, step timing and walk events.
//!
//! A creature is idle while no walk event is pending and walking while one
//! is. Following is tracked separately (see [`follow`]) and may overlap
//! either state. Walk events are armed through [`crate::dispatch`], which
//! keeps at most one pending walk event per creature.

mod follow;
mod notify;

pub use follow::{internal_follow_creature, set_follow_creature, validate_walk_path};
pub use notify::{
    is_in_range, on_creature_appear, on_creature_disappear, on_creature_move, on_tile_update,
};

use tracing::{debug, trace};

use crate::condition::ConditionType;
use crate::config::GameConfig;
use crate::dispatch::{self, Reschedule};
use crate::env::{RollContext, WalkPath};
use crate::types::{CreatureId, Direction, Tick};
use crate::world::{EventHandle, SimContext};

/// Per-creature walk bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkState {
    pub path: WalkPath,
    /// Pending walk event, if any.
    pub event: Option<EventHandle>,
    pub last_move: Option<Tick>,
    pub follow: Option<CreatureId>,
    pub follow_distance: u32,
    /// Set when the follow path needs recomputing on the next think-tick.
    pub update_follow: bool,
}

impl Default for WalkState {
    fn default() -> Self {
        Self {
            path: WalkPath::new(),
            event: None,
            last_move: None,
            follow: None,
            follow_distance: GameConfig::DEFAULT_FOLLOW_DISTANCE,
            update_follow: false,
        }
    }
}

/// Time one step takes on the creature's current tile.
///
/// Tiles without a ground speed factor, removed creatures and creatures off
/// the map use the configured default. A step always takes at least one tick.
pub fn step_duration(ctx: &SimContext<'_>, id: CreatureId) -> u64 {
    let default = ctx.config.default_step_duration.max(1);
    let Some(creature) = ctx.live(id) else {
        return default;
    };
    let ground_speed = ctx
        .world
        .position_of(id)
        .and_then(|position| ctx.env.tile(position))
        .map(|tile| tile.ground_speed)
        .unwrap_or(0);
    if ground_speed == 0 {
        return default;
    }

    let speed = match creature.speed() {
        0 => ctx.config.fallback_speed,
        speed => speed,
    };
    (1000 * u64::from(ground_speed) / u64::from(speed.max(1))).max(1)
}

/// Signed time until the next step is allowed; zero if the creature never moved.
pub fn sleep_ticks(ctx: &SimContext<'_>, id: CreatureId) -> i64 {
    let Some(last_move) = ctx.live(id).and_then(|creature| creature.walk.last_move) else {
        return 0;
    };
    let ready_at = last_move + step_duration(ctx, id);
    ctx.now().until(ready_at)
}

/// Delay of the next walk event: the remaining sleep, or a full step when ready now.
pub fn event_step_ticks(ctx: &SimContext<'_>, id: CreatureId) -> u64 {
    match sleep_ticks(ctx, id) {
        ticks if ticks > 0 => ticks.unsigned_abs(),
        _ => step_duration(ctx, id),
    }
}

/// Replaces the walk path. An idle creature gets its first walk event; a
/// walking one picks the new path up on its pending event.
pub fn start_auto_walk(ctx: &mut SimContext<'_>, id: CreatureId, path: WalkPath) -> bool {
    let Some(creature) = ctx.creature_mut(id) else {
        return false;
    };
    if creature.is_removed() {
        return false;
    }
    debug!(
        target: "creature::movement",
        creature = %id,
        steps = path.len(),
        walking = creature.is_walking(),
        "path replaced"
    );
    creature.walk.path = path;

    if creature.is_walking() {
        return true;
    }
    let delay = event_step_ticks(ctx, id);
    dispatch::arm_walk(ctx, id, delay)
}

/// Cancels the pending walk event. A non-empty path is dropped and
/// `on_walk_aborted` fires.
pub fn stop_auto_walk(ctx: &mut SimContext<'_>, id: CreatureId) {
    stop_walk_event(ctx, id);

    let Some(creature) = ctx.creature_mut(id) else {
        return;
    };
    if creature.walk.path.is_empty() {
        return;
    }
    creature.walk.path.clear();
    debug!(target: "creature::movement", creature = %id, "walk aborted");

    if let Some(behavior) = ctx.behavior(id) {
        behavior.on_walk_aborted(ctx, id);
    }
}

/// Cancels the pending walk event without touching the path.
pub fn stop_walk_event(ctx: &mut SimContext<'_>, id: CreatureId) {
    let Some(handle) = ctx
        .creature_mut(id)
        .and_then(|creature| creature.walk.event.take())
    else {
        return;
    };
    ctx.world.cancel(handle);
}

/// Walk event body: takes one step of the path.
///
/// A failed step only marks the follow path dirty. The next event is
/// requested unless the creature is removed or has neither steps left nor a
/// follow target.
pub fn on_walk(ctx: &mut SimContext<'_>, id: CreatureId) -> Reschedule {
    let Some(creature) = ctx.creature_mut(id) else {
        return Reschedule::Stop;
    };
    creature.walk.event = None;
    if creature.is_removed() {
        return Reschedule::Stop;
    }

    let drunk = creature.has_condition(ConditionType::Drunk);
    if let Some(planned) = creature.walk.path.pop_front() {
        let direction = if drunk { stumble(ctx, id, planned) } else { planned };
        let now = ctx.now();

        match ctx.world.move_creature(id, direction) {
            Ok(position) => {
                trace!(target: "creature::movement", creature = %id, ?direction, %position, "step");
                if let Some(creature) = ctx.creature_mut(id) {
                    creature.walk.last_move = Some(now);
                    creature.direction = direction;
                }
            }
            Err(error) => {
                trace!(
                    target: "creature::movement",
                    creature = %id,
                    ?direction,
                    %error,
                    "step failed"
                );
                if let Some(creature) = ctx.creature_mut(id) {
                    creature.walk.update_follow = true;
                }
            }
        }
    }

    let Some(creature) = ctx.live(id) else {
        return Reschedule::Stop;
    };
    if creature.walk.path.is_empty() && creature.walk.follow.is_none() {
        return Reschedule::Stop;
    }
    Reschedule::After(event_step_ticks(ctx, id))
}

/// Drunk stepping: a five-way roll between north, west, the planned step,
/// south and east.
fn stumble(ctx: &SimContext<'_>, id: CreatureId, planned: Direction) -> Direction {
    match ctx.roll_range(id, RollContext::Stumble, 0, 4) {
        0 => Direction::North,
        1 => Direction::West,
        3 => Direction::South,
        4 => Direction::East,
        _ => planned,
    }
}
