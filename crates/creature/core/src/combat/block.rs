//! Hit mitigation: immunity, defense and armor.

use tracing::trace;

use super::DamageType;
use crate::env::RollContext;
use crate::types::CreatureId;
use crate::world::SimContext;

/// Outcome classification of a single hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockType {
    #[default]
    None,
    Immunity,
    Defense,
    Armor,
}

/// Mitigation checks requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockChecks {
    pub defense: bool,
    pub armor: bool,
}

impl BlockChecks {
    pub const NONE: Self = Self {
        defense: false,
        armor: false,
    };
    pub const ALL: Self = Self {
        defense: true,
        armor: true,
    };
}

/// Block result plus the damage left after mitigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitResolution {
    pub block: BlockType,
    pub damage: u32,
}

impl HitResolution {
    pub fn is_blocked(&self) -> bool {
        self.block != BlockType::None
    }
}

/// Per-tick availability of the defense and armor rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockAvailability {
    pub defense: bool,
    pub armor: bool,
}

impl BlockAvailability {
    pub const READY: Self = Self {
        defense: true,
        armor: true,
    };

    pub fn reset(&mut self) {
        *self = Self::READY;
    }
}

impl Default for BlockAvailability {
    fn default() -> Self {
        Self::READY
    }
}

/// Damage absorbed by armor: `roll * armor * damage / divisor`.
pub fn armor_reduction(roll: u32, armor: u32, damage: u32, divisor: u32) -> u32 {
    let divisor = u64::from(divisor.max(1));
    let reduction = u64::from(roll) * u64::from(armor) * u64::from(damage) / divisor;
    u32::try_from(reduction).unwrap_or(u32::MAX)
}

/// Resolves mitigation of a hit on `defender`.
///
/// Immunity short-circuits. Otherwise at most one defense and one armor roll
/// happen per creature per think-tick; once consumed, further hits in the
/// same tick skip that check. A successful defense roll skips armor.
///
/// Afterwards the attacker (if still live) sees `on_attacked_creature` and
/// `on_attacked_creature_block_hit`, and the defender sees `on_attacked`.
pub fn block_hit(
    ctx: &mut SimContext<'_>,
    defender: CreatureId,
    attacker: Option<CreatureId>,
    damage_type: DamageType,
    damage: u32,
    checks: BlockChecks,
) -> HitResolution {
    let Some(creature) = ctx.live(defender) else {
        return HitResolution {
            block: BlockType::None,
            damage,
        };
    };
    let behavior = creature.behavior();
    let immune = behavior.immunities(creature).is_immune(damage_type);
    let defense = behavior.defense(creature);
    let armor = behavior.armor(creature);
    let available = creature.blocks;

    let mut resolution = HitResolution {
        block: BlockType::None,
        damage,
    };

    if immune {
        resolution = HitResolution {
            block: BlockType::Immunity,
            damage: 0,
        };
    }

    if resolution.block == BlockType::None && checks.defense && available.defense {
        consume(ctx, defender, |blocks| blocks.defense = false);
        let roll = ctx.roll_percent(defender, RollContext::Defense);
        if roll < defense {
            resolution = HitResolution {
                block: BlockType::Defense,
                damage: 0,
            };
        }
    }

    if resolution.block == BlockType::None && checks.armor && available.armor {
        consume(ctx, defender, |blocks| blocks.armor = false);
        let roll = ctx.roll_percent(defender, RollContext::Armor);
        let reduction = armor_reduction(roll, armor, resolution.damage, ctx.config.armor_divisor);
        if reduction >= resolution.damage {
            resolution = HitResolution {
                block: BlockType::Armor,
                damage: 0,
            };
        } else {
            resolution.damage -= reduction;
        }
    }

    trace!(
        target: "creature::combat",
        creature = %defender,
        damage,
        remaining = resolution.damage,
        block = ?resolution.block,
        "hit resolved"
    );

    if let Some(attacker) = attacker.filter(|id| ctx.is_live(*id)) {
        if let Some(attacker_behavior) = ctx.behavior(attacker) {
            attacker_behavior.on_attacked_creature(ctx, attacker, defender);
            attacker_behavior.on_attacked_creature_block_hit(
                ctx,
                attacker,
                defender,
                resolution.block,
            );
        }
    }
    behavior.on_attacked(ctx, defender);

    resolution
}

fn consume(ctx: &mut SimContext<'_>, id: CreatureId, f: impl FnOnce(&mut BlockAvailability)) {
    if let Some(creature) = ctx.creature_mut(id) {
        f(&mut creature.blocks);
    }
}
