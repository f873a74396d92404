//! Combat resolver: mitigation, health and mana loss, attack targets.
//!
//! All operations take the [`SimContext`] and address creatures by id. A hit
//! is normally resolved in two steps: [`block_hit`] decides how much of the
//! raw damage gets through, then [`drain_health`] applies what is left,
//! records it in the victim's [`DamageLedger`] and hands over to the death
//! resolver once health reaches zero.

mod block;
mod damage;
mod ledger;

pub use block::{
    BlockAvailability, BlockChecks, BlockType, HitResolution, armor_reduction, block_hit,
};
pub use damage::{DamageType, Immunities};
pub use ledger::DamageLedger;

use tracing::{debug, trace};

use crate::death;
use crate::types::CreatureId;
use crate::world::SimContext;

/// Removes `amount` health from `target` (flooring at 0).
///
/// The full amount is recorded in the ledger under `attacker`, or under
/// [`CreatureId::ENVIRONMENT`] when there is none, and the attacker is
/// notified through `on_attacked_creature_drain_health`. Reaching zero health
/// runs the death resolver exactly once.
///
/// Returns the health actually lost.
pub fn drain_health(
    ctx: &mut SimContext<'_>,
    target: CreatureId,
    attacker: Option<CreatureId>,
    damage_type: DamageType,
    amount: u32,
) -> u32 {
    let Some(creature) = ctx.creature_mut(target) else {
        return 0;
    };
    if creature.is_removed() || creature.is_dead() {
        return 0;
    }

    let lost = creature.change_health(-i64::from(amount)).unsigned_abs() as u32;
    creature.damage.record(attacker, amount);
    let depleted = creature.health().is_empty();

    debug!(
        target: "creature::combat",
        creature = %target,
        attacker = ?attacker,
        damage_type = ?damage_type,
        amount,
        lost,
        "health drained"
    );

    if let Some(attacker) = attacker.filter(|id| ctx.is_live(*id)) {
        if let Some(behavior) = ctx.behavior(attacker) {
            behavior.on_attacked_creature_drain_health(ctx, attacker, target, amount);
        }
    }

    if depleted {
        death::die(ctx, target);
    }

    lost
}

/// Removes `amount` mana from `target`. The target's `on_attacked` fires first.
///
/// Returns the mana actually lost.
pub fn drain_mana(
    ctx: &mut SimContext<'_>,
    target: CreatureId,
    attacker: Option<CreatureId>,
    amount: u32,
) -> u32 {
    let Some(behavior) = ctx.live(target).map(|creature| creature.behavior()) else {
        return 0;
    };
    behavior.on_attacked(ctx, target);

    let Some(creature) = ctx.creature_mut(target) else {
        return 0;
    };
    let lost = creature.change_mana(-i64::from(amount)).unsigned_abs() as u32;
    trace!(
        target: "creature::combat",
        creature = %target,
        attacker = ?attacker,
        amount,
        lost,
        "mana drained"
    );
    lost
}

/// Sets the attack target of `attacker` and every one of its summons.
///
/// A present target notifies the attacker (`on_attacked_creature`) and the
/// target (`on_attacked`). Summons follow their master's target, recursively.
pub fn set_attacked_creature(
    ctx: &mut SimContext<'_>,
    attacker: CreatureId,
    target: Option<CreatureId>,
) {
    let target = target.filter(|id| ctx.is_live(*id));
    let Some(creature) = ctx.creature_mut(attacker) else {
        return;
    };
    creature.attacked = target;
    let summons = creature.summons().to_vec();

    trace!(target: "creature::combat", creature = %attacker, target = ?target, "attack target set");

    if let Some(target) = target {
        if let Some(behavior) = ctx.behavior(attacker) {
            behavior.on_attacked_creature(ctx, attacker, target);
        }
        if let Some(behavior) = ctx.behavior(target) {
            behavior.on_attacked(ctx, target);
        }
    }

    for summon in summons {
        // A summon is never its own target.
        if Some(summon) != target && ctx.world.creature(summon).is_some() {
            set_attacked_creature(ctx, summon, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockWorld, TestEnv};
    use crate::types::Position;

    const VICTIM: CreatureId = CreatureId(1);
    const A: CreatureId = CreatureId(2);
    const B: CreatureId = CreatureId(3);

    fn world() -> MockWorld {
        let mut world = MockWorld::new();
        world.spawn_generic(VICTIM, Position::new(0, 0), 1000);
        world.spawn_generic(A, Position::new(1, 0), 1000);
        world.spawn_generic(B, Position::new(0, 1), 1000);
        world
    }

    #[test]
    fn ledger_totals_equal_sum_of_drains() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        drain_health(&mut ctx, VICTIM, Some(A), DamageType::Physical, 300);
        drain_health(&mut ctx, VICTIM, Some(B), DamageType::Fire, 200);
        drain_health(&mut ctx, VICTIM, None, DamageType::Drown, 50);

        let victim = ctx.live(VICTIM).expect("victim");
        let ledger = victim.damage_ledger();
        assert_eq!(ledger.damage_by(A), 300);
        assert_eq!(ledger.damage_by(B), 200);
        assert_eq!(ledger.damage_by(CreatureId::ENVIRONMENT), 50);
        assert_eq!(ledger.total(), 550);
        assert_eq!(ledger.last_hit(), Some(CreatureId::ENVIRONMENT));
        assert_eq!(victim.health().current, 450);
    }

    #[test]
    fn health_floors_at_zero_and_death_runs_once() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        let lost = drain_health(&mut ctx, VICTIM, Some(A), DamageType::Physical, 5000);
        assert_eq!(lost, 1000);
        assert_eq!(drain_health(&mut ctx, VICTIM, Some(B), DamageType::Physical, 10), 0);

        let victim = ctx.world.creature(VICTIM).expect("victim");
        assert_eq!(victim.health().current, 0);
        assert!(victim.is_dead());
        drop(ctx);
        assert_eq!(world.deaths().len(), 1);
    }

    #[test]
    fn mana_drain_clamps_and_notifies_target() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        let lost = drain_mana(&mut ctx, VICTIM, Some(A), 10_000);
        assert_eq!(lost, 100);
        assert_eq!(ctx.live(VICTIM).expect("victim").mana().current, 0);
        drop(ctx);
        assert!(world.hook_log().contains(&format!("{VICTIM} attacked")));
    }

    #[test]
    fn attack_target_propagates_to_summons() {
        let mut world = world();
        let summon = CreatureId(4);
        world.spawn_generic(summon, Position::new(2, 0), 100);
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        crate::creature::add_summon(&mut ctx, A, summon);
        set_attacked_creature(&mut ctx, A, Some(VICTIM));

        assert_eq!(ctx.live(A).and_then(|c| c.attacked_creature()), Some(VICTIM));
        assert_eq!(ctx.live(summon).and_then(|c| c.attacked_creature()), Some(VICTIM));

        set_attacked_creature(&mut ctx, A, None);
        assert_eq!(ctx.live(summon).and_then(|c| c.attacked_creature()), None);
    }

    #[test]
    fn vanished_target_is_not_attacked() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);

        set_attacked_creature(&mut ctx, A, Some(CreatureId(77)));
        assert_eq!(ctx.live(A).and_then(|c| c.attacked_creature()), None);
    }
}
