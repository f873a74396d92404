//! Death and experience resolver.
//!
//! Runs once per creature when its health reaches zero: resolves the
//! killers from the damage ledger, notifies them and every other attacker,
//! creates the corpse and hands a [`DeathReport`] to the world.

use tracing::{debug, info};

use crate::combat::DamageLedger;
use crate::env::{Item, ItemTypeId};
use crate::types::{CreatureId, Position};
use crate::world::SimContext;

/// Killers resolved from a ledger. Either may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Killers {
    pub last_hit: Option<CreatureId>,
    pub most_damage: Option<CreatureId>,
}

impl Killers {
    pub fn is_empty(&self) -> bool {
        self.last_hit.is_none() && self.most_damage.is_none()
    }
}

/// Everything the world needs to finish a death.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathReport {
    pub victim: CreatureId,
    pub position: Option<Position>,
    pub last_hit: Option<CreatureId>,
    pub most_damage: Option<CreatureId>,
    /// Experience offered to each live attacker other than the victim.
    pub experience: Vec<(CreatureId, u64)>,
    pub corpse: Option<Item>,
}

impl DeathReport {
    pub fn experience_for(&self, attacker: CreatureId) -> u64 {
        self.experience
            .iter()
            .find(|(id, _)| *id == attacker)
            .map(|(_, exp)| *exp)
            .unwrap_or(0)
    }

    pub fn total_experience(&self) -> u64 {
        self.experience.iter().map(|(_, exp)| exp).sum()
    }
}

/// Resolves the last-hit and most-damage killers of `ledger`.
///
/// Only live creatures qualify. The most-damage walk visits attackers in
/// ascending id order: an entry above the current best replaces the candidate
/// with its registry lookup even when that lookup fails, while the best
/// damage only advances on a successful lookup. A larger entry of a vanished
/// attacker therefore hides an earlier live candidate.
pub fn killers(ctx: &SimContext<'_>, ledger: &DamageLedger) -> Killers {
    let last_hit = ledger.last_hit().filter(|id| ctx.is_live(*id));

    let mut most_damage = None;
    let mut best = 0;
    for (attacker, damage) in ledger.entries() {
        if damage > best {
            most_damage = ctx.is_live(attacker).then_some(attacker);
            if most_damage.is_some() {
                best = damage;
            }
        }
    }

    Killers {
        last_hit,
        most_damage,
    }
}

/// Runs the death of `victim`.
///
/// Returns `None` if the victim is unknown, removed, or already dead; hooks
/// that cascade into further damage on the same victim land here and stop.
pub fn die(ctx: &mut SimContext<'_>, victim: CreatureId) -> Option<DeathReport> {
    let creature = ctx.creature_mut(victim)?;
    if creature.is_removed() || creature.is_dead() {
        return None;
    }
    creature.dead = true;

    // Hooks below may touch the victim; work from a snapshot.
    let ledger = creature.damage.clone();
    let behavior = creature.behavior();
    let lost_experience = behavior.lost_experience(creature);
    let corpse_type = behavior.corpse_item(creature);

    let killers = killers(ctx, &ledger);
    info!(
        target: "creature::death",
        creature = %victim,
        last_hit = ?killers.last_hit,
        most_damage = ?killers.most_damage,
        lost_experience,
        "creature died"
    );

    if let Some(killer) = killers.last_hit {
        if let Some(killer_behavior) = ctx.behavior(killer) {
            killer_behavior.on_killed_creature(ctx, killer, victim);
        }
    }
    if let Some(killer) = killers.most_damage.filter(|id| Some(*id) != killers.last_hit) {
        if let Some(killer_behavior) = ctx.behavior(killer) {
            killer_behavior.on_killed_creature(ctx, killer, victim);
        }
    }

    let mut experience = Vec::with_capacity(ledger.len());
    for attacker in ledger.attackers() {
        if !ctx.is_live(attacker) {
            continue;
        }
        let share = ledger.experience_share(attacker, lost_experience);
        if attacker != victim {
            experience.push((attacker, share));
        }
        debug!(
            target: "creature::death",
            creature = %victim,
            attacker = %attacker,
            share,
            "attacker notified"
        );
        if let Some(attacker_behavior) = ctx.behavior(attacker) {
            attacker_behavior.on_attacked_creature_killed(ctx, attacker, victim, share);
        }
    }

    let corpse = corpse_type.and_then(|item_type| create_corpse(ctx, victim, item_type));
    let report = DeathReport {
        victim,
        position: ctx.world.position_of(victim),
        last_hit: killers.last_hit,
        most_damage: killers.most_damage,
        experience,
        corpse,
    };
    ctx.world.creature_died(&report);
    Some(report)
}

/// Creates the corpse item; a container corpse is filled by the loot oracle.
fn create_corpse(ctx: &SimContext<'_>, victim: CreatureId, item_type: ItemTypeId) -> Option<Item> {
    let env = ctx.env;
    let mut corpse = env.items().ok()?.create_item(item_type)?;

    if let Some(container) = corpse.container_mut() {
        match (env.loot(), ctx.world.creature(victim)) {
            (Ok(loot), Some(creature)) => loot.drop_loot(creature, container),
            (Err(error), _) => {
                debug!(target: "creature::death", creature = %victim, %error, "corpse left empty");
            }
            (Ok(_), None) => {}
        }
    }

    Some(corpse)
}
