//! Item definitions and loot tables served through the core item oracles.
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use creature_core::{
    Container, Creature, Item, ItemDefinition, ItemOracle, ItemTypeId, LootOracle, PcgRng,
    RngOracle, RollContext, Tick, compute_seed,
};

use crate::api::{Result, RuntimeError};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
}

impl ItemCatalog {
    pub fn new(items: Vec<ItemDefinition>) -> Self {
        Self { items }
    }

    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content)
            .map_err(|e| RuntimeError::InvalidConfig(format!("failed to parse item catalog: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_ron_str(&content)
    }
}

impl ItemOracle for ItemCatalog {
    fn definition(&self, item_type: ItemTypeId) -> Option<ItemDefinition> {
        self.items
            .iter()
            .find(|definition| definition.item_type == item_type)
            .cloned()
    }
}

/// One possible drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_type: ItemTypeId,
    /// Drop chance in percent; 100 always drops.
    pub chance: u32,
}

/// Loot tables keyed by creature name.
///
/// Rolls are seeded from the game seed, the victim and the entry index, so
/// the same death always drops the same items.
#[derive(Debug, Clone, Default)]
pub struct TableLoot {
    game_seed: u64,
    tables: HashMap<String, Vec<LootEntry>>,
}

impl TableLoot {
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            tables: HashMap::new(),
        }
    }

    pub fn with_table(mut self, creature: impl Into<String>, entries: Vec<LootEntry>) -> Self {
        self.tables.insert(creature.into(), entries);
        self
    }
}

impl LootOracle for TableLoot {
    fn drop_loot(&self, victim: &Creature, corpse: &mut Container) {
        let Some(entries) = self.tables.get(victim.name()) else {
            return;
        };
        for (index, entry) in entries.iter().enumerate() {
            let seed = compute_seed(
                self.game_seed,
                Tick(index as u64),
                victim.id(),
                RollContext::Loot,
            );
            if PcgRng.roll_percent(seed) >= entry.chance {
                continue;
            }
            if corpse.add(Item::simple(entry.item_type)).is_err() {
                break;
            }
        }
    }
}
