//! Routing of scheduled creature events and (re)arming of their successors.
//!
//! Tick functions never schedule their own follow-up; they return a
//! [`Reschedule`] and [`dispatch`] turns it into the next task. Each creature
//! has at most one pending walk event and one pending think event; their
//! handles live on the creature and are cleared when the event fires.

use tracing::{trace, warn};

use crate::creature;
use crate::error::GameError;
use crate::movement;
use crate::types::CreatureId;
use crate::world::{CreatureEvent, SimContext};

/// What a tick function wants to happen next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reschedule {
    /// Run again after this many ticks.
    After(u64),
    Stop,
}

/// Runs a fired event to completion and arms its successor.
pub fn dispatch(ctx: &mut SimContext<'_>, event: CreatureEvent) {
    trace!(target: "creature::dispatch", ?event, now = %ctx.now(), "dispatch");

    match event {
        CreatureEvent::Walk(id) => {
            if let Reschedule::After(delay) = movement::on_walk(ctx, id) {
                arm_walk(ctx, id, delay);
            }
        }
        CreatureEvent::Think { creature, interval } => {
            if let Some(this) = ctx.creature_mut(creature) {
                this.think_event = None;
            }
            if let Reschedule::After(delay) = creature::on_think(ctx, creature, interval) {
                arm_think(ctx, creature, delay, interval);
            }
        }
    }
}

/// Schedules a walk event for `id` unless it is removed or already walking.
///
/// Returns whether a walk event is pending afterwards.
pub(crate) fn arm_walk(ctx: &mut SimContext<'_>, id: CreatureId, delay: u64) -> bool {
    match ctx.live(id) {
        None => return false,
        Some(creature) if creature.walk.event.is_some() => return true,
        Some(_) => {}
    }

    match ctx.world.schedule(delay, CreatureEvent::Walk(id)) {
        Ok(handle) => {
            if let Some(creature) = ctx.creature_mut(id) {
                creature.walk.event = Some(handle);
            }
            true
        }
        Err(error) => {
            warn!(
                target: "creature::dispatch",
                creature = %id,
                code = error.error_code(),
                %error,
                "walk event rejected, retrying on next think"
            );
            false
        }
    }
}

/// Schedules the next think event for `id` unless it is removed or one is pending.
pub(crate) fn arm_think(
    ctx: &mut SimContext<'_>,
    id: CreatureId,
    delay: u64,
    interval: u64,
) -> bool {
    match ctx.live(id) {
        None => return false,
        Some(creature) if creature.think_event.is_some() => return true,
        Some(_) => {}
    }

    match ctx.world.schedule(delay, CreatureEvent::Think { creature: id, interval }) {
        Ok(handle) => {
            if let Some(creature) = ctx.creature_mut(id) {
                creature.think_event = Some(handle);
            }
            true
        }
        Err(error) => {
            warn!(
                target: "creature::dispatch",
                creature = %id,
                code = error.error_code(),
                %error,
                "think event rejected"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::start_thinking;
    use crate::env::WalkPath;
    use crate::movement::start_auto_walk;
    use crate::test_support::{MockWorld, TestEnv};
    use crate::types::{Direction, Position};

    const ID: CreatureId = CreatureId(1);

    #[test]
    fn think_rearms_itself_once() {
        let mut world = MockWorld::new();
        world.spawn_generic(ID, Position::new(0, 0), 100);
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        assert!(start_thinking(&mut ctx, ID));
        assert!(start_thinking(&mut ctx, ID));
        drop(ctx);
        assert_eq!(world.pending_events(), 1);

        let event = world.fire_next().expect("think");
        let mut ctx = env.context(&mut world);
        dispatch(&mut ctx, event);
        drop(ctx);
        assert_eq!(world.pending_events(), 1);
    }

    #[test]
    fn rejected_walk_is_rearmed_by_think() {
        let mut world = MockWorld::new();
        world.spawn_generic(ID, Position::new(0, 0), 100);
        world.reject_schedules(true);
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        assert!(!start_auto_walk(&mut ctx, ID, WalkPath::from([Direction::East])));
        assert!(!ctx.live(ID).expect("creature").is_walking());
        drop(ctx);

        world.reject_schedules(false);
        let mut ctx = env.context(&mut world);
        creature::on_think(&mut ctx, ID, 1000);
        assert!(ctx.live(ID).expect("creature").is_walking());
    }
}
