//! Reference host world: registry, positions, timer queue and corpses.
//!
//! [`InMemoryWorld`] implements every mutable contract of the creature core.
//! It only records what happened (moves, deaths) in an outbox; turning those
//! records into spectator notifications, removals and broadcast events is
//! the simulation worker's job.
mod scheduler;

pub use scheduler::EventQueue;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use creature_core::{
    Creature, CreatureEvent, CreatureId, CreatureRegistry, DeathReport, DeathSink, Direction,
    EventHandle, Item, MapOracle, MoveError, MoveExecutor, Position, ScheduleError, Scheduler,
    Tick, ViewRange,
};

use crate::api::{Result, RuntimeError};
use crate::oracle::GridMap;

/// Something the worker still has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldChange {
    Moved {
        creature: CreatureId,
        from: Position,
        to: Position,
    },
    Died(DeathReport),
}

#[derive(Debug)]
pub struct InMemoryWorld {
    map: Arc<GridMap>,
    creatures: BTreeMap<CreatureId, Creature>,
    positions: BTreeMap<CreatureId, Position>,
    queue: EventQueue,
    outbox: Vec<WorldChange>,
    corpses: Vec<(Position, Item)>,
    next_id: u32,
}

impl InMemoryWorld {
    pub fn new(map: Arc<GridMap>) -> Self {
        Self {
            map,
            creatures: BTreeMap::new(),
            positions: BTreeMap::new(),
            queue: EventQueue::new(),
            outbox: Vec::new(),
            corpses: Vec::new(),
            next_id: CreatureId::ENVIRONMENT.0,
        }
    }

    /// Next unused creature id; the environment id is never handed out.
    pub fn allocate_id(&mut self) -> CreatureId {
        self.next_id += 1;
        CreatureId(self.next_id)
    }

    /// Registers `creature` on a free, walkable tile.
    pub fn insert(&mut self, creature: Creature, position: Position) -> Result<()> {
        if !self.map.is_walkable(position) || self.occupant(position).is_some() {
            return Err(RuntimeError::InvalidPosition(position));
        }
        debug!(target: "runtime::world", creature = %creature.id(), %position, "creature placed");
        self.positions.insert(creature.id(), position);
        self.creatures.insert(creature.id(), creature);
        Ok(())
    }

    /// Live creature standing on `position`.
    pub fn occupant(&self, position: Position) -> Option<CreatureId> {
        self.positions
            .iter()
            .find(|(id, at)| **at == position && self.is_live(**id))
            .map(|(id, _)| *id)
    }

    pub fn is_live(&self, id: CreatureId) -> bool {
        self.creatures.get(&id).is_some_and(|creature| !creature.is_removed())
    }

    /// Live creatures that can see `position`.
    pub fn spectators(&self, position: Position, range: ViewRange) -> Vec<CreatureId> {
        self.positions
            .iter()
            .filter(|(id, at)| self.is_live(**id) && range.contains(**at, position))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn take_changes(&mut self) -> Vec<WorldChange> {
        std::mem::take(&mut self.outbox)
    }

    /// Drops removed creatures nobody holds anymore.
    pub fn reclaim(&mut self) -> Vec<CreatureId> {
        let reclaimable: Vec<CreatureId> = self
            .creatures
            .values()
            .filter(|creature| creature.is_reclaimable())
            .map(Creature::id)
            .collect();
        for id in &reclaimable {
            self.creatures.remove(id);
            self.positions.remove(id);
            debug!(target: "runtime::world", creature = %id, "creature reclaimed");
        }
        reclaimable
    }

    pub fn corpses(&self) -> &[(Position, Item)] {
        &self.corpses
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub(crate) fn pop_due(&mut self, until: Tick) -> Option<CreatureEvent> {
        self.queue.pop_due(until)
    }

    pub(crate) fn advance_to(&mut self, tick: Tick) {
        self.queue.advance_to(tick);
    }

    pub(crate) fn close(&mut self) {
        self.queue.close();
    }
}

impl CreatureRegistry for InMemoryWorld {
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

impl Scheduler for InMemoryWorld {
    fn now(&self) -> Tick {
        self.queue.now()
    }

    fn schedule(
        &mut self,
        delay: u64,
        event: CreatureEvent,
    ) -> std::result::Result<EventHandle, ScheduleError> {
        self.queue.schedule(delay, event)
    }

    fn cancel(&mut self, handle: EventHandle) {
        self.queue.cancel(handle);
    }
}

impl MoveExecutor for InMemoryWorld {
    fn position_of(&self, id: CreatureId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    fn move_creature(
        &mut self,
        id: CreatureId,
        direction: Direction,
    ) -> std::result::Result<Position, MoveError> {
        let from = self
            .position_of(id)
            .filter(|_| self.is_live(id))
            .ok_or(MoveError::CreatureNotFound(id))?;
        let destination = from.step(direction);

        let Some(tile) = self.map.tile(destination) else {
            return Err(MoveError::Invalid { destination });
        };
        if !tile.walkable {
            return Err(MoveError::Blocked { destination });
        }
        if self.occupant(destination).is_some() {
            return Err(MoveError::Occupied { destination });
        }

        self.positions.insert(id, destination);
        self.outbox.push(WorldChange::Moved {
            creature: id,
            from,
            to: destination,
        });
        Ok(destination)
    }
}

impl DeathSink for InMemoryWorld {
    fn creature_died(&mut self, report: &DeathReport) {
        if let (Some(position), Some(corpse)) = (report.position, report.corpse.clone()) {
            self.corpses.push((position, corpse));
        }
        self.outbox.push(WorldChange::Died(report.clone()));
    }
}
