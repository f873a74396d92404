//! Summons, removal and the think-tick.

use tracing::debug;

use crate::combat::set_attacked_creature;
use crate::condition::{abort_conditions, execute_conditions};
use crate::dispatch::{self, Reschedule};
use crate::movement::{event_step_ticks, internal_follow_creature};
use crate::types::CreatureId;
use crate::world::SimContext;

/// Makes `summon` a summon of `master` and takes a lifecycle hold on it.
///
/// Rejected when either is gone, when `summon` already has a master, or when
/// it would make a creature its own (indirect) master.
pub fn add_summon(ctx: &mut SimContext<'_>, master: CreatureId, summon: CreatureId) -> bool {
    if master == summon || !ctx.is_live(master) {
        return false;
    }
    match ctx.live(summon) {
        Some(creature) if creature.master().is_none() => {}
        _ => return false,
    }

    // Walk up the master chain to refuse cycles.
    let mut ancestor = ctx.live(master).and_then(|creature| creature.master());
    while let Some(id) = ancestor {
        if id == summon {
            return false;
        }
        ancestor = ctx.world.creature(id).and_then(|creature| creature.master());
    }

    if let Some(creature) = ctx.creature_mut(summon) {
        creature.master = Some(master);
        creature.acquire();
    }
    if let Some(creature) = ctx.creature_mut(master) {
        creature.summons.push(summon);
    }
    debug!(target: "creature::lifecycle", creature = %master, summon = %summon, "summon added");
    true
}

/// Detaches `summon` from `master` and releases the hold taken by [`add_summon`].
pub fn remove_summon(ctx: &mut SimContext<'_>, master: CreatureId, summon: CreatureId) -> bool {
    let Some(creature) = ctx.creature_mut(master) else {
        return false;
    };
    let Some(index) = creature.summons.iter().position(|id| *id == summon) else {
        return false;
    };
    creature.summons.remove(index);

    if let Some(creature) = ctx.creature_mut(summon) {
        creature.master = None;
        creature.release();
    }
    debug!(target: "creature::lifecycle", creature = %master, summon = %summon, "summon removed");
    true
}

/// Removes `id` from the simulation.
///
/// Marks the creature removed first, so nothing new is scheduled for it,
/// then cancels its events, detaches every summon (clearing their master and
/// attack target and releasing their holds), leaves its own master, aborts
/// all conditions and drops ledger, path and targets. Safe to re-enter from
/// hooks fired along the way; a second call is a no-op.
pub fn remove_creature(ctx: &mut SimContext<'_>, id: CreatureId) {
    let Some(creature) = ctx.creature_mut(id) else {
        return;
    };
    if creature.is_removed() {
        return;
    }
    creature.removed = true;

    let events = [creature.walk.event.take(), creature.think_event.take()];
    let summons = std::mem::take(&mut creature.summons);
    let master = creature.master.take();
    debug!(target: "creature::lifecycle", creature = %id, summons = summons.len(), "removing");

    for handle in events.into_iter().flatten() {
        ctx.world.cancel(handle);
    }

    for summon in summons {
        let Some(creature) = ctx.creature_mut(summon) else {
            continue;
        };
        if creature.master != Some(id) {
            continue;
        }
        creature.master = None;
        creature.release();
        set_attacked_creature(ctx, summon, None);

        if let Some(behavior) = ctx.behavior(summon) {
            behavior.on_master_detached(ctx, summon, id);
        }
    }

    if let Some(master) = master {
        if let Some(creature) = ctx.creature_mut(master) {
            creature.summons.retain(|summon| *summon != id);
        }
        if let Some(creature) = ctx.creature_mut(id) {
            creature.release();
        }
    }

    abort_conditions(ctx, id);

    if let Some(creature) = ctx.creature_mut(id) {
        creature.damage.clear();
        creature.walk.path.clear();
        creature.walk.follow = None;
        creature.walk.update_follow = false;
        creature.attacked = None;
    }
}

/// Arms the first think event at the configured interval.
pub fn start_thinking(ctx: &mut SimContext<'_>, id: CreatureId) -> bool {
    let interval = ctx.config.think_interval;
    dispatch::arm_think(ctx, id, interval, interval)
}

/// Think-tick body.
///
/// Resets the per-tick block rolls, recomputes a dirty follow path, ticks
/// conditions by `interval`, runs the variant's own `on_think` and re-arms a
/// walk event that went missing (for instance after a rejected schedule).
pub fn on_think(ctx: &mut SimContext<'_>, id: CreatureId, interval: u64) -> Reschedule {
    let Some(creature) = ctx.creature_mut(id) else {
        return Reschedule::Stop;
    };
    if creature.is_removed() || creature.is_dead() {
        return Reschedule::Stop;
    }

    creature.blocks.reset();
    let refollow = match creature.walk.follow {
        Some(target) if creature.walk.update_follow => {
            creature.walk.update_follow = false;
            Some(target)
        }
        _ => None,
    };

    if let Some(target) = refollow {
        internal_follow_creature(ctx, id, Some(target));
    }

    execute_conditions(ctx, id, interval);

    if let Some(behavior) = ctx.behavior(id) {
        behavior.on_think(ctx, id, interval);
    }

    let Some(creature) = ctx.live(id) else {
        return Reschedule::Stop;
    };
    if creature.is_dead() {
        return Reschedule::Stop;
    }
    let wants_walk = !creature.walk.path.is_empty() || creature.walk.follow.is_some();
    if wants_walk && !creature.is_walking() {
        let delay = event_step_ticks(ctx, id);
        dispatch::arm_walk(ctx, id, delay);
    }

    Reschedule::After(interval)
}
