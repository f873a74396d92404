//! Oracle implementations backing the runtime world.
//!
//! These implementations expose the `creature-core` oracle traits and bundle
//! them into an [`OracleManager`] so the worker can build
//! [`creature_core::GameEnv`] views on demand. The data is immutable at
//! runtime; dynamic state lives in [`crate::InMemoryWorld`].
mod items;
mod map;
mod paths;

use std::sync::Arc;

use creature_core::{Env, GameEnv, PcgRng};

pub use items::{ItemCatalog, LootEntry, TableLoot};
pub use map::GridMap;
pub use paths::StraightLinePaths;

/// Manages all oracle implementations and provides unified access
#[derive(Clone, Debug)]
pub struct OracleManager {
    pub(crate) map: Arc<GridMap>,
    pub(crate) paths: Arc<StraightLinePaths>,
    pub(crate) items: Arc<ItemCatalog>,
    pub(crate) loot: Arc<TableLoot>,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    /// Path finding runs on the same map the world moves on.
    pub fn new(map: Arc<GridMap>, items: Arc<ItemCatalog>, loot: Arc<TableLoot>) -> Self {
        let paths = Arc::new(StraightLinePaths::new(Arc::clone(&map)));
        Self {
            map,
            paths,
            items,
            loot,
            rng: PcgRng, // stateless
        }
    }

    /// Open map without items or loot.
    pub fn open_field(width: u32, height: u32) -> Self {
        Self::new(
            Arc::new(GridMap::open_field(width, height)),
            Arc::new(ItemCatalog::default()),
            Arc::new(TableLoot::default()),
        )
    }

    pub fn as_game_env(&self) -> GameEnv<'_> {
        Env::with_all(
            self.map.as_ref(),
            self.paths.as_ref(),
            self.items.as_ref(),
            self.loot.as_ref(),
            &self.rng,
        )
        .as_game_env()
    }

    pub fn map(&self) -> Arc<GridMap> {
        Arc::clone(&self.map)
    }
}
