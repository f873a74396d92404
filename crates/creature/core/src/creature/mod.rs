//! The creature aggregate.
//!
//! A [`Creature`] owns its vitals, conditions, damage ledger and walk state.
//! Everything it knows about other creatures (master, summons, attack and
//! follow targets) is an id resolved through the registry on every use.
//! Per-variant behavior lives behind [`CreatureBehavior`].

mod behavior;
mod lifecycle;
mod template;

pub use behavior::{CreatureBehavior, CreatureKind, GenericBehavior, defaults};
pub use lifecycle::{
    add_summon, on_think, remove_creature, remove_summon, start_thinking,
};
pub use template::{CreatureTemplate, CreatureTemplateBuilder, TemplateBehavior};

use std::sync::Arc;

use crate::combat::{BlockAvailability, DamageLedger};
use crate::condition::{Condition, ConditionList, ConditionType, StatusModifiers};
use crate::env::WalkPath;
use crate::movement::WalkState;
use crate::types::{CreatureId, Direction, LightInfo, ResourceMeter};
use crate::world::EventHandle;

/// Base abstraction for players, monsters, NPCs and summons.
///
/// # Invariants
///
/// - `health.current <= health.maximum`, same for mana
/// - at most one condition per [`ConditionType`]
/// - `removed` and `dead` are one-way flags
/// - `status` always reflects the active conditions
#[derive(Clone, Debug)]
pub struct Creature {
    id: CreatureId,
    name: String,
    behavior: Arc<dyn CreatureBehavior>,

    health: ResourceMeter,
    mana: ResourceMeter,
    base_speed: u32,
    pub direction: Direction,
    experience: u64,

    // === Owned sub-components ===
    pub(crate) status: StatusModifiers,
    pub(crate) conditions: ConditionList,
    pub(crate) damage: DamageLedger,
    pub(crate) walk: WalkState,
    pub(crate) blocks: BlockAvailability,

    // === Relationships (resolved through the registry) ===
    pub(crate) master: Option<CreatureId>,
    pub(crate) summons: Vec<CreatureId>,
    pub(crate) attacked: Option<CreatureId>,
    /// Lifecycle holds taken by masters (and hosts); see [`Creature::is_reclaimable`].
    holds: u32,

    pub(crate) think_event: Option<EventHandle>,
    pub(crate) removed: bool,
    pub(crate) dead: bool,
}

impl Creature {
    pub fn new(
        id: CreatureId,
        name: impl Into<String>,
        behavior: Arc<dyn CreatureBehavior>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            behavior,
            health: ResourceMeter::full(100),
            mana: ResourceMeter::full(0),
            base_speed: 220,
            direction: Direction::default(),
            experience: 0,
            status: StatusModifiers::default(),
            conditions: ConditionList::new(),
            damage: DamageLedger::new(),
            walk: WalkState::default(),
            blocks: BlockAvailability::READY,
            master: None,
            summons: Vec::new(),
            attacked: None,
            holds: 0,
            think_event: None,
            removed: false,
            dead: false,
        }
    }

    /// Creature with [`GenericBehavior`].
    pub fn generic(id: CreatureId, name: impl Into<String>) -> Self {
        Self::new(id, name, Arc::new(GenericBehavior))
    }

    /// Swaps the capability interface, e.g. to decorate the current one.
    pub fn with_behavior(mut self, behavior: Arc<dyn CreatureBehavior>) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_health(mut self, maximum: u32) -> Self {
        self.health = ResourceMeter::full(maximum);
        self
    }

    pub fn with_mana(mut self, maximum: u32) -> Self {
        self.mana = ResourceMeter::full(maximum);
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.base_speed = speed;
        self
    }

    pub fn with_light(mut self, light: LightInfo) -> Self {
        self.status = StatusModifiers::with_light(light);
        self
    }

    pub fn with_follow_distance(mut self, distance: u32) -> Self {
        self.walk.follow_distance = distance;
        self
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> Arc<dyn CreatureBehavior> {
        Arc::clone(&self.behavior)
    }

    pub fn kind(&self) -> CreatureKind {
        self.behavior.kind()
    }

    pub fn description(&self, look_distance: u32) -> String {
        self.behavior.description(self, look_distance)
    }

    // ===== vitals =====

    pub fn health(&self) -> ResourceMeter {
        self.health
    }

    pub fn mana(&self) -> ResourceMeter {
        self.mana
    }

    /// Signed health change clamped to `[0, maximum]`; returns the applied delta.
    pub fn change_health(&mut self, delta: i64) -> i64 {
        self.health.change(delta)
    }

    /// Signed mana change clamped to `[0, maximum]`; returns the applied delta.
    pub fn change_mana(&mut self, delta: i64) -> i64 {
        self.mana.change(delta)
    }

    pub fn base_speed(&self) -> u32 {
        self.base_speed
    }

    pub fn set_base_speed(&mut self, speed: u32) {
        self.base_speed = speed;
    }

    /// Base speed plus condition modifiers, never negative.
    pub fn speed(&self) -> u32 {
        let speed = i64::from(self.base_speed) + i64::from(self.status.speed_delta);
        u32::try_from(speed.max(0)).unwrap_or(u32::MAX)
    }

    pub fn light(&self) -> LightInfo {
        self.status.light
    }

    pub fn status(&self) -> &StatusModifiers {
        &self.status
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub(crate) fn add_experience(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
    }

    // ===== conditions & ledger =====

    pub fn conditions(&self) -> &ConditionList {
        &self.conditions
    }

    pub fn has_condition(&self, kind: ConditionType) -> bool {
        self.conditions.has(kind)
    }

    pub fn condition(&self, kind: ConditionType) -> Option<&Condition> {
        self.conditions.get(kind)
    }

    pub fn damage_ledger(&self) -> &DamageLedger {
        &self.damage
    }

    pub fn block_availability(&self) -> BlockAvailability {
        self.blocks
    }

    // ===== movement =====

    pub fn walk_path(&self) -> &WalkPath {
        &self.walk.path
    }

    /// True while a walk event is pending.
    pub fn is_walking(&self) -> bool {
        self.walk.event.is_some()
    }

    pub fn walk_event(&self) -> Option<EventHandle> {
        self.walk.event
    }

    pub fn think_event(&self) -> Option<EventHandle> {
        self.think_event
    }

    pub fn follow_creature(&self) -> Option<CreatureId> {
        self.walk.follow
    }

    pub fn follow_distance(&self) -> u32 {
        self.walk.follow_distance
    }

    // ===== relationships =====

    pub fn master(&self) -> Option<CreatureId> {
        self.master
    }

    pub fn summons(&self) -> &[CreatureId] {
        &self.summons
    }

    pub fn attacked_creature(&self) -> Option<CreatureId> {
        self.attacked
    }

    pub fn hold_count(&self) -> u32 {
        self.holds
    }

    /// Takes a lifecycle hold; the registry must keep the creature while any hold remains.
    pub fn acquire(&mut self) {
        self.holds += 1;
    }

    /// Releases a lifecycle hold taken with [`Creature::acquire`].
    pub fn release(&mut self) {
        debug_assert!(self.holds > 0, "release without acquire on {}", self.id);
        self.holds = self.holds.saturating_sub(1);
    }

    // ===== lifecycle flags =====

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Removed and no longer held by anyone.
    pub fn is_reclaimable(&self) -> bool {
        self.removed && self.holds == 0
    }

    /// Plain-data view for hosts and observers.
    pub fn snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind(),
            health: self.health,
            mana: self.mana,
            speed: self.speed(),
            light: self.light(),
            direction: self.direction,
            experience: self.experience,
            conditions: self.conditions.kinds().into_iter().collect(),
            master: self.master,
            summons: self.summons.clone(),
            attacked: self.attacked,
            follow: self.walk.follow,
            path_len: self.walk.path.len(),
            walking: self.is_walking(),
            removed: self.removed,
            dead: self.dead,
        }
    }
}

/// Serializable copy of a creature's observable state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureSnapshot {
    pub id: CreatureId,
    pub name: String,
    pub kind: CreatureKind,
    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub speed: u32,
    pub light: LightInfo,
    pub direction: Direction,
    pub experience: u64,
    pub conditions: Vec<ConditionType>,
    pub master: Option<CreatureId>,
    pub summons: Vec<CreatureId>,
    pub attacked: Option<CreatureId>,
    pub follow: Option<CreatureId>,
    pub path_len: usize,
    pub walking: bool,
    pub removed: bool,
    pub dead: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_stay_within_bounds() {
        let mut creature = Creature::generic(CreatureId(1), "rat").with_health(1000).with_mana(50);

        for delta in [-300, 5000, -10_000, 42, i64::MIN / 2, i64::MAX / 2] {
            creature.change_health(delta);
            creature.change_mana(delta);
            assert!(creature.health().current <= creature.health().maximum);
            assert!(creature.mana().current <= creature.mana().maximum);
        }
    }

    #[test]
    fn speed_never_goes_negative() {
        let mut creature = Creature::generic(CreatureId(1), "rat").with_speed(100);
        creature.status.speed_delta = -500;
        assert_eq!(creature.speed(), 0);
        creature.status.speed_delta = 40;
        assert_eq!(creature.speed(), 140);
    }

    #[test]
    fn reclaimable_only_when_removed_and_unheld() {
        let mut creature = Creature::generic(CreatureId(1), "rat");
        creature.acquire();
        creature.removed = true;
        assert!(!creature.is_reclaimable());
        creature.release();
        assert!(creature.is_reclaimable());
    }

    #[test]
    fn default_description() {
        let creature = Creature::generic(CreatureId(1), "rat");
        assert_eq!(creature.description(1), "a creature");
        assert_eq!(creature.kind(), CreatureKind::Generic);
    }
}
