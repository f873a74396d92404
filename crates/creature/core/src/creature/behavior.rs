//! Capability interface of creature variants.

use std::fmt;

use tracing::{debug, trace};

use super::Creature;
use crate::combat::{BlockType, Immunities};
use crate::condition::{ConditionType, EndReason, remove_condition};
use crate::env::ItemTypeId;
use crate::types::CreatureId;
use crate::world::SimContext;

/// Variant tag of a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CreatureKind {
    #[default]
    Generic,
    Player,
    Monster,
    Npc,
    Summon,
}

/// Overridable values and reaction hooks of a creature variant.
///
/// Every method has a default, so a variant overrides only what it needs.
/// Value methods receive the creature itself; reaction hooks receive the
/// context and the creature's id (`this`) since they may reach any creature
/// in the world. Hooks run synchronously inside the operation that fired
/// them and may re-enter any creature operation.
pub trait CreatureBehavior: Send + Sync + fmt::Debug {
    fn kind(&self) -> CreatureKind {
        CreatureKind::Generic
    }

    fn description(&self, _creature: &Creature, _look_distance: u32) -> String {
        String::from("a creature")
    }

    /// Defense value; the chance in percent of blocking a hit outright.
    fn defense(&self, _creature: &Creature) -> u32 {
        0
    }

    fn armor(&self, _creature: &Creature) -> u32 {
        0
    }

    fn immunities(&self, _creature: &Creature) -> Immunities {
        Immunities::empty()
    }

    /// Experience split between attackers on death.
    fn lost_experience(&self, _creature: &Creature) -> u64 {
        0
    }

    fn corpse_item(&self, _creature: &Creature) -> Option<ItemTypeId> {
        None
    }

    // ===== conditions =====

    fn on_condition_added(&self, ctx: &mut SimContext<'_>, this: CreatureId, kind: ConditionType) {
        defaults::on_condition_added(ctx, this, kind);
    }

    fn on_condition_ended(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _kind: ConditionType,
        _reason: EndReason,
    ) {
    }

    /// Whether `kind` counts down this tick. Its effect applies either way.
    fn on_tick_condition(
        &self,
        ctx: &SimContext<'_>,
        this: CreatureId,
        kind: ConditionType,
    ) -> bool {
        defaults::on_tick_condition(ctx, this, kind)
    }

    // ===== combat =====

    fn on_attacked_creature(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _target: CreatureId,
    ) {
    }

    fn on_attacked(&self, _ctx: &mut SimContext<'_>, _this: CreatureId) {}

    fn on_attacked_creature_block_hit(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _target: CreatureId,
        _block: BlockType,
    ) {
    }

    fn on_attacked_creature_drain_health(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _target: CreatureId,
        _points: u32,
    ) {
    }

    /// Fired for every live attacker of a dead creature with its experience share.
    fn on_attacked_creature_killed(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        target: CreatureId,
        experience: u64,
    ) {
        if target != this {
            self.on_gain_experience(ctx, this, experience);
        }
    }

    /// Fired for the last-hit and most-damage killers.
    fn on_killed_creature(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _target: CreatureId,
    ) {
    }

    fn on_gain_experience(&self, ctx: &mut SimContext<'_>, this: CreatureId, amount: u64) {
        defaults::gain_experience(ctx, this, amount);
    }

    // ===== movement & lifecycle =====

    /// Variant upkeep, run at the end of every think-tick.
    fn on_think(&self, _ctx: &mut SimContext<'_>, _this: CreatureId, _interval: u64) {}

    fn on_follow_creature(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _target: Option<CreatureId>,
    ) {
    }

    /// A non-empty walk path was dropped by `stop_auto_walk`.
    fn on_walk_aborted(&self, _ctx: &mut SimContext<'_>, _this: CreatureId) {}

    /// The master of this summon went away.
    fn on_master_detached(
        &self,
        _ctx: &mut SimContext<'_>,
        _this: CreatureId,
        _master: CreatureId,
    ) {
    }
}

/// Base behavior of every hook that has one, for overriding variants to fall back on.
pub mod defaults {
    use super::*;

    /// Paralyze cancels haste.
    pub fn on_condition_added(ctx: &mut SimContext<'_>, this: CreatureId, kind: ConditionType) {
        let has_haste = ctx
            .live(this)
            .is_some_and(|creature| creature.has_condition(ConditionType::Haste));
        if kind == ConditionType::Paralyze && has_haste {
            remove_condition(ctx, this, ConditionType::Haste);
        }
    }

    /// Fire, energy and poison hold while standing in a field of their own type.
    pub fn on_tick_condition(ctx: &SimContext<'_>, this: CreatureId, kind: ConditionType) -> bool {
        let Some(held_by) = kind.field_damage() else {
            return true;
        };
        let field = ctx
            .world
            .position_of(this)
            .and_then(|position| ctx.env.tile(position))
            .and_then(|tile| tile.field);
        field != Some(held_by)
    }

    pub fn gain_experience(ctx: &mut SimContext<'_>, this: CreatureId, amount: u64) {
        if amount == 0 {
            return;
        }
        if let Some(creature) = ctx.creature_mut(this) {
            creature.add_experience(amount);
            debug!(
                target: "creature::death",
                creature = %this,
                amount,
                total = creature.experience(),
                "experience gained"
            );
        } else {
            trace!(
                target: "creature::death",
                creature = %this,
                amount,
                "experience for vanished creature dropped"
            );
        }
    }
}

/// Plain creature with every default.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericBehavior;

impl CreatureBehavior for GenericBehavior {}
