//! Condition lifecycle against the owning creature and its hooks.

use tracing::{debug, trace};

use super::{AddOutcome, Condition, ConditionPulse, ConditionType, EndReason};
use crate::combat;
use crate::types::CreatureId;
use crate::world::SimContext;

/// Adds `condition` to `id`, merging it into an active condition of the same type.
///
/// `None` is a silent no-op. `on_condition_added` fires for every condition
/// that did not merge, including one that was spent before it could start;
/// merges are not announced. Returns whether the condition is now active.
pub fn add_condition(
    ctx: &mut SimContext<'_>,
    id: CreatureId,
    condition: Option<Condition>,
) -> bool {
    let Some(condition) = condition else {
        return false;
    };
    let kind = condition.kind;

    let Some(creature) = ctx.creature_mut(id) else {
        return false;
    };
    if creature.is_removed() {
        return false;
    }

    let outcome = creature.conditions.insert(condition, &mut creature.status);
    debug_assert!(creature.conditions.iter().filter(|c| c.kind == kind).count() <= 1);

    match outcome {
        AddOutcome::Merged => {
            trace!(target: "creature::condition", creature = %id, kind = kind.as_str(), "merged");
            true
        }
        AddOutcome::Rejected => {
            trace!(target: "creature::condition", creature = %id, kind = kind.as_str(), "rejected");
            notify_added(ctx, id, kind);
            false
        }
        AddOutcome::Started => {
            debug!(
                target: "creature::condition",
                creature = %id,
                kind = kind.as_str(),
                ticks = condition.ticks,
                "added"
            );
            notify_added(ctx, id, kind);
            true
        }
    }
}

fn notify_added(ctx: &mut SimContext<'_>, id: CreatureId, kind: ConditionType) {
    if let Some(behavior) = ctx.behavior(id) {
        behavior.on_condition_added(ctx, id, kind);
    }
}

/// Ends and discards the first condition of `kind` on `id`.
pub fn remove_condition(ctx: &mut SimContext<'_>, id: CreatureId, kind: ConditionType) -> bool {
    let Some(creature) = ctx.creature_mut(id) else {
        return false;
    };
    let removed = creature
        .conditions
        .remove(kind, &mut creature.status, EndReason::Aborted);
    if removed.is_none() {
        return false;
    }

    debug!(target: "creature::condition", creature = %id, kind = kind.as_str(), "removed");
    if let Some(behavior) = ctx.behavior(id) {
        behavior.on_condition_ended(ctx, id, kind, EndReason::Aborted);
    }
    true
}

/// Runs one tick of every active condition on `id`.
///
/// Conditions are visited in insertion order. Hooks and periodic damage may
/// add, remove or abort conditions (or kill the owner) mid-pass; each step
/// re-resolves the creature and skips whatever is gone.
pub fn execute_conditions(ctx: &mut SimContext<'_>, id: CreatureId, elapsed: u64) {
    let Some(behavior) = ctx.behavior(id) else {
        return;
    };
    let Some(kinds) = ctx.live(id).map(|creature| creature.conditions.kinds()) else {
        return;
    };

    for kind in kinds {
        let counts_down = behavior.on_tick_condition(ctx, id, kind);

        let Some(creature) = ctx.creature_mut(id) else {
            return;
        };
        if creature.is_removed() || creature.is_dead() {
            return;
        }
        let Some(condition) = creature.conditions.get_mut(kind) else {
            continue;
        };
        let pulse = condition.execute(elapsed, counts_down);
        trace!(
            target: "creature::condition",
            creature = %id,
            kind = kind.as_str(),
            ticks = condition.ticks,
            "tick"
        );

        match pulse {
            Some(ConditionPulse::Damage {
                damage_type,
                amount,
                owner,
            }) => {
                // A vanished owner turns the damage environmental.
                let attacker = owner.filter(|owner| ctx.is_live(*owner));
                combat::drain_health(ctx, id, attacker, damage_type, amount);
            }
            Some(ConditionPulse::Heal { health, mana }) => {
                if let Some(creature) = ctx.creature_mut(id) {
                    creature.change_health(i64::from(health));
                    creature.change_mana(i64::from(mana));
                }
            }
            None => {}
        }

        let Some(creature) = ctx.creature_mut(id) else {
            return;
        };
        let expired = creature
            .conditions
            .get(kind)
            .is_some_and(Condition::is_expired);
        if !expired {
            continue;
        }

        creature
            .conditions
            .remove(kind, &mut creature.status, EndReason::Expired);
        debug!(target: "creature::condition", creature = %id, kind = kind.as_str(), "expired");
        behavior.on_condition_ended(ctx, id, kind, EndReason::Expired);
    }
}

/// Ends every condition on `id` with [`EndReason::Aborted`].
pub fn abort_conditions(ctx: &mut SimContext<'_>, id: CreatureId) {
    let Some(creature) = ctx.creature_mut(id) else {
        return;
    };
    let ended = creature.conditions.abort_all(&mut creature.status);
    if ended.is_empty() {
        return;
    }

    debug!(target: "creature::condition", creature = %id, count = ended.len(), "aborted all");
    if let Some(behavior) = ctx.behavior(id) {
        for kind in ended {
            behavior.on_condition_ended(ctx, id, kind, EndReason::Aborted);
        }
    }
}
