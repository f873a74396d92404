//! In-memory world and oracles for unit tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::combat::{BlockType, Immunities};
use crate::condition::{ConditionType, EndReason};
use crate::config::GameConfig;
use crate::creature::{Creature, CreatureBehavior, CreatureKind, CreatureTemplate};
use crate::death::DeathReport;
use crate::env::{
    Container, Env, FindPathParams, Item, ItemDefinition, ItemOracle, ItemTypeId, LootOracle,
    MapOracle, PathError, PathOracle, PcgRng, RngOracle, TileView, WalkPath,
};
use crate::error::ErrorContext;
use crate::types::{CreatureId, Direction, Position, Tick};
use crate::world::{
    CreatureEvent, CreatureRegistry, DeathSink, EventHandle, MoveError, MoveExecutor,
    ScheduleError, Scheduler, SimContext,
};

type HookLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct Pending {
    due: Tick,
    event: CreatureEvent,
}

/// Registry, scheduler and grid in one struct.
#[derive(Debug, Default)]
pub(crate) struct MockWorld {
    creatures: BTreeMap<CreatureId, Creature>,
    positions: BTreeMap<CreatureId, Position>,
    blocked: BTreeSet<Position>,
    now: Tick,
    next_handle: u64,
    pending: BTreeMap<EventHandle, Pending>,
    reject: bool,
    deaths: Vec<DeathReport>,
    log: HookLog,
}

impl MockWorld {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Generic creature with `max_health` health and 100 mana, hooks recorded.
    pub(crate) fn spawn_generic(&mut self, id: CreatureId, position: Position, max_health: u32) {
        let creature = Creature::generic(id, "creature")
            .with_health(max_health)
            .with_mana(100);
        self.spawn_recorded(creature, position);
    }

    /// Creature built from `template`, hooks recorded.
    pub(crate) fn spawn_template(
        &mut self,
        id: CreatureId,
        position: Position,
        template: &CreatureTemplate,
    ) {
        self.spawn_recorded(template.to_creature(id, &GameConfig::default()), position);
    }

    /// Registers `creature` as is, without hook recording.
    pub(crate) fn insert(&mut self, creature: Creature, position: Position) {
        self.positions.insert(creature.id(), position);
        self.creatures.insert(creature.id(), creature);
    }

    fn spawn_recorded(&mut self, creature: Creature, position: Position) {
        let behavior = RecordingBehavior {
            inner: creature.behavior(),
            log: Arc::clone(&self.log),
        };
        self.insert(creature.with_behavior(Arc::new(behavior)), position);
    }

    pub(crate) fn creature_entry(&mut self, id: CreatureId) -> &mut Creature {
        self.creatures.get_mut(&id).expect("creature registered")
    }

    pub(crate) fn set_now(&mut self, now: Tick) {
        self.now = now;
    }

    pub(crate) fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn pending_walk_events(&self, id: CreatureId) -> usize {
        self.pending
            .values()
            .filter(|pending| pending.event == CreatureEvent::Walk(id))
            .count()
    }

    /// Pops the earliest pending event and advances the clock to it.
    pub(crate) fn fire_next(&mut self) -> Option<CreatureEvent> {
        let handle = self
            .pending
            .iter()
            .min_by_key(|(handle, pending)| (pending.due, **handle))
            .map(|(handle, _)| *handle)?;
        let pending = self.pending.remove(&handle)?;
        self.now = self.now.max(pending.due);
        Some(pending.event)
    }

    pub(crate) fn reject_schedules(&mut self, reject: bool) {
        self.reject = reject;
    }

    pub(crate) fn position(&self, id: CreatureId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub(crate) fn teleport(&mut self, id: CreatureId, position: Position) {
        self.positions.insert(id, position);
    }

    pub(crate) fn block(&mut self, position: Position) {
        self.blocked.insert(position);
    }

    pub(crate) fn hook_log(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub(crate) fn deaths(&self) -> &[DeathReport] {
        &self.deaths
    }
}

impl CreatureRegistry for MockWorld {
    fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    fn creature_ids(&self) -> Vec<CreatureId> {
        self.creatures.keys().copied().collect()
    }
}

impl Scheduler for MockWorld {
    fn now(&self) -> Tick {
        self.now
    }

    fn schedule(&mut self, delay: u64, event: CreatureEvent) -> Result<EventHandle, ScheduleError> {
        if self.reject {
            return Err(ScheduleError::Rejected {
                event,
                context: ErrorContext::new(self.now).with_message("test rejection"),
            });
        }
        self.next_handle += 1;
        let handle = EventHandle(self.next_handle);
        self.pending.insert(
            handle,
            Pending {
                due: self.now + delay,
                event,
            },
        );
        Ok(handle)
    }

    fn cancel(&mut self, handle: EventHandle) {
        self.pending.remove(&handle);
    }
}

impl MoveExecutor for MockWorld {
    fn position_of(&self, id: CreatureId) -> Option<Position> {
        self.position(id)
    }

    fn move_creature(
        &mut self,
        id: CreatureId,
        direction: Direction,
    ) -> Result<Position, MoveError> {
        let from = self.position(id).ok_or(MoveError::CreatureNotFound(id))?;
        let destination = from.step(direction);
        if self.blocked.contains(&destination) {
            return Err(MoveError::Blocked { destination });
        }
        let occupied = self.positions.iter().any(|(other, position)| {
            *other != id
                && *position == destination
                && self.creatures.get(other).is_some_and(|c| !c.is_removed())
        });
        if occupied {
            return Err(MoveError::Occupied { destination });
        }
        self.positions.insert(id, destination);
        Ok(destination)
    }
}

impl DeathSink for MockWorld {
    fn creature_died(&mut self, report: &DeathReport) {
        self.deaths.push(report.clone());
    }
}

/// Wraps a behavior and appends one line per reaction hook to a shared log.
#[derive(Debug)]
pub(crate) struct RecordingBehavior {
    inner: Arc<dyn CreatureBehavior>,
    log: HookLog,
}

impl RecordingBehavior {
    fn record(&self, line: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(line);
        }
    }
}

impl CreatureBehavior for RecordingBehavior {
    fn kind(&self) -> CreatureKind {
        self.inner.kind()
    }

    fn description(&self, creature: &Creature, look_distance: u32) -> String {
        self.inner.description(creature, look_distance)
    }

    fn defense(&self, creature: &Creature) -> u32 {
        self.inner.defense(creature)
    }

    fn armor(&self, creature: &Creature) -> u32 {
        self.inner.armor(creature)
    }

    fn immunities(&self, creature: &Creature) -> Immunities {
        self.inner.immunities(creature)
    }

    fn lost_experience(&self, creature: &Creature) -> u64 {
        self.inner.lost_experience(creature)
    }

    fn corpse_item(&self, creature: &Creature) -> Option<ItemTypeId> {
        self.inner.corpse_item(creature)
    }

    fn on_condition_added(&self, ctx: &mut SimContext<'_>, this: CreatureId, kind: ConditionType) {
        self.record(format!("{this} condition_added {kind:?}"));
        self.inner.on_condition_added(ctx, this, kind);
    }

    fn on_condition_ended(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        kind: ConditionType,
        reason: EndReason,
    ) {
        self.record(format!("{this} condition_ended {kind:?} {reason:?}"));
        self.inner.on_condition_ended(ctx, this, kind, reason);
    }

    fn on_tick_condition(
        &self,
        ctx: &SimContext<'_>,
        this: CreatureId,
        kind: ConditionType,
    ) -> bool {
        self.inner.on_tick_condition(ctx, this, kind)
    }

    fn on_attacked_creature(&self, ctx: &mut SimContext<'_>, this: CreatureId, target: CreatureId) {
        self.record(format!("{this} attacked {target}"));
        self.inner.on_attacked_creature(ctx, this, target);
    }

    fn on_attacked(&self, ctx: &mut SimContext<'_>, this: CreatureId) {
        self.record(format!("{this} attacked"));
        self.inner.on_attacked(ctx, this);
    }

    fn on_attacked_creature_block_hit(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        target: CreatureId,
        block: BlockType,
    ) {
        self.record(format!("{this} block_hit {target} {block:?}"));
        self.inner.on_attacked_creature_block_hit(ctx, this, target, block);
    }

    fn on_attacked_creature_drain_health(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        target: CreatureId,
        points: u32,
    ) {
        self.record(format!("{this} drained {target} {points}"));
        self.inner.on_attacked_creature_drain_health(ctx, this, target, points);
    }

    fn on_attacked_creature_killed(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        target: CreatureId,
        experience: u64,
    ) {
        self.record(format!("{this} share {target} {experience}"));
        self.inner.on_attacked_creature_killed(ctx, this, target, experience);
    }

    fn on_killed_creature(&self, ctx: &mut SimContext<'_>, this: CreatureId, target: CreatureId) {
        self.record(format!("{this} killed {target}"));
        self.inner.on_killed_creature(ctx, this, target);
    }

    fn on_gain_experience(&self, ctx: &mut SimContext<'_>, this: CreatureId, amount: u64) {
        self.inner.on_gain_experience(ctx, this, amount);
    }

    fn on_think(&self, ctx: &mut SimContext<'_>, this: CreatureId, interval: u64) {
        self.inner.on_think(ctx, this, interval);
    }

    fn on_follow_creature(
        &self,
        ctx: &mut SimContext<'_>,
        this: CreatureId,
        target: Option<CreatureId>,
    ) {
        self.record(format!("{this} follow {target:?}"));
        self.inner.on_follow_creature(ctx, this, target);
    }

    fn on_walk_aborted(&self, ctx: &mut SimContext<'_>, this: CreatureId) {
        self.record(format!("{this} walk_aborted"));
        self.inner.on_walk_aborted(ctx, this);
    }

    fn on_master_detached(&self, ctx: &mut SimContext<'_>, this: CreatureId, master: CreatureId) {
        self.record(format!("{this} master_detached {master}"));
        self.inner.on_master_detached(ctx, this, master);
    }
}

/// Oracles for tests: a flat walkable map, greedy straight-line paths,
/// a small item table, fixed loot and an optionally fixed rng.
#[derive(Debug, Default)]
pub(crate) struct TestEnv {
    tiles: HashMap<Position, TileView>,
    items: HashMap<ItemTypeId, ItemDefinition>,
    loot: Vec<ItemTypeId>,
    roll: Option<u32>,
    config: GameConfig,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_tile(mut self, position: Position, tile: TileView) -> Self {
        self.tiles.insert(position, tile);
        self
    }

    pub(crate) fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Every rng draw returns `value`.
    pub(crate) fn with_fixed_roll(mut self, value: u32) -> Self {
        self.roll = Some(value);
        self
    }

    pub(crate) fn with_container(mut self, item_type: ItemTypeId, capacity: u16) -> Self {
        self.items
            .insert(item_type, ItemDefinition::new(item_type, "corpse").container(capacity));
        self
    }

    pub(crate) fn with_loot(mut self, item_type: ItemTypeId) -> Self {
        self.loot.push(item_type);
        self
    }

    pub(crate) fn context<'a>(&'a self, world: &'a mut MockWorld) -> SimContext<'a> {
        let env = Env::with_all(self, self, self, self, self).as_game_env();
        SimContext::new(world, env, &self.config)
    }
}

impl MapOracle for TestEnv {
    fn tile(&self, position: Position) -> Option<TileView> {
        Some(self.tiles.get(&position).copied().unwrap_or(TileView::ground(0)))
    }
}

impl PathOracle for TestEnv {
    fn find_path(
        &self,
        from: Position,
        to: Position,
        params: FindPathParams,
    ) -> Result<WalkPath, PathError> {
        if from.distance(to) > params.max_search_distance {
            return Err(PathError::OutOfRange {
                from,
                to,
                max: params.max_search_distance,
            });
        }

        let mut path = WalkPath::new();
        let mut current = from;
        while !params.accepts(current.distance(to)) {
            if current.distance(to) < params.min_distance {
                return Err(PathError::NoPath { from, to });
            }
            let direction = Direction::from_delta(to.x - current.x, to.y - current.y)
                .ok_or(PathError::NoPath { from, to })?;
            current = current.step(direction);
            path.push(direction);
        }
        Ok(path)
    }
}

impl ItemOracle for TestEnv {
    fn definition(&self, item_type: ItemTypeId) -> Option<ItemDefinition> {
        self.items.get(&item_type).cloned()
    }
}

impl LootOracle for TestEnv {
    fn drop_loot(&self, _victim: &Creature, corpse: &mut Container) {
        for item_type in &self.loot {
            // Full corpses just drop the rest.
            let _ = corpse.add(Item::simple(*item_type));
        }
    }
}

impl RngOracle for TestEnv {
    fn next_u32(&self, seed: u64) -> u32 {
        self.roll.unwrap_or_else(|| PcgRng.next_u32(seed))
    }
}

#[test]
fn greedy_paths_stop_at_distance() {
    let env = TestEnv::new();
    let params = FindPathParams::follow(1, GameConfig::MAX_FOLLOW_SEARCH);
    let path = env
        .find_path(Position::new(0, 0), Position::new(3, 0), params)
        .expect("path");
    assert_eq!(path.len(), 2);
    assert!(env
        .find_path(Position::new(0, 0), Position::new(40, 0), params)
        .is_err());
}
