//! Events emitted during simulation for front-ends to observe.
//!
//! Consumers subscribe to [`SimEvent`] to react to world changes without
//! blocking the worker loop. Delivery is best-effort: slow subscribers lag.
use serde::{Deserialize, Serialize};

use creature_core::{CreatureId, DeathReport, Item, Position, Tick};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned {
        creature: CreatureId,
        name: String,
        position: Position,
    },
    Moved {
        creature: CreatureId,
        from: Position,
        to: Position,
    },
    Died {
        victim: CreatureId,
        last_hit: Option<CreatureId>,
        most_damage: Option<CreatureId>,
        experience: Vec<(CreatureId, u64)>,
    },
    CorpsePlaced {
        position: Position,
        corpse: Item,
    },
    Removed {
        creature: CreatureId,
    },
    /// The simulation clock moved forward.
    Advanced {
        now: Tick,
    },
}

impl SimEvent {
    pub(crate) fn died(report: &DeathReport) -> Self {
        SimEvent::Died {
            victim: report.victim,
            last_hit: report.last_hit,
            most_damage: report.most_damage,
            experience: report.experience.clone(),
        }
    }
}
