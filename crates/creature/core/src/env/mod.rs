//! Traits describing read-only world data.
//!
//! Oracles expose tile data, path search, item definitions, loot policy and
//! dice. The [`Env`] aggregate bundles them so the creature layer can reach
//! everything it needs without hard coupling to concrete implementations.
mod error;
mod items;
mod map;
mod path;
mod rng;

pub use error::OracleError;
pub use items::{Container, Item, ItemDefinition, ItemOracle, ItemTypeId, LootOracle};
pub use map::{MapOracle, TileView};
pub use path::{FindPathParams, PathError, PathOracle, WalkPath};
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};

/// Aggregates read-only oracles required by the creature layer.
pub struct Env<'a, M, P, I, L, R>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    I: ItemOracle + ?Sized,
    L: LootOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    map: Option<&'a M>,
    paths: Option<&'a P>,
    items: Option<&'a I>,
    loot: Option<&'a L>,
    rng: Option<&'a R>,
}

// Manual impls: derives would demand `Clone`/`Debug` of the (unsized) oracles.
impl<M, P, I, L, R> Clone for Env<'_, M, P, I, L, R>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    I: ItemOracle + ?Sized,
    L: LootOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, P, I, L, R> Copy for Env<'_, M, P, I, L, R>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    I: ItemOracle + ?Sized,
    L: LootOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

impl<M, P, I, L, R> std::fmt::Debug for Env<'_, M, P, I, L, R>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    I: ItemOracle + ?Sized,
    L: LootOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("map", &self.map.is_some())
            .field("paths", &self.paths.is_some())
            .field("items", &self.items.is_some())
            .field("loot", &self.loot.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}

pub type GameEnv<'a> = Env<
    'a,
    dyn MapOracle + 'a,
    dyn PathOracle + 'a,
    dyn ItemOracle + 'a,
    dyn LootOracle + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, M, P, I, L, R> Env<'a, M, P, I, L, R>
where
    M: MapOracle + ?Sized,
    P: PathOracle + ?Sized,
    I: ItemOracle + ?Sized,
    L: LootOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        map: Option<&'a M>,
        paths: Option<&'a P>,
        items: Option<&'a I>,
        loot: Option<&'a L>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            map,
            paths,
            items,
            loot,
            rng,
        }
    }

    pub fn with_all(map: &'a M, paths: &'a P, items: &'a I, loot: &'a L, rng: &'a R) -> Self {
        Self::new(Some(map), Some(paths), Some(items), Some(loot), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            map: None,
            paths: None,
            items: None,
            loot: None,
            rng: None,
        }
    }

    /// Returns the MapOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::MapNotAvailable` if no map oracle was provided.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the PathOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::PathsNotAvailable` if no path oracle was provided.
    pub fn paths(&self) -> Result<&'a P, OracleError> {
        self.paths.ok_or(OracleError::PathsNotAvailable)
    }

    /// Returns the ItemOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ItemsNotAvailable` if no item oracle was provided.
    pub fn items(&self) -> Result<&'a I, OracleError> {
        self.items.ok_or(OracleError::ItemsNotAvailable)
    }

    /// Returns the LootOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::LootNotAvailable` if no loot oracle was provided.
    pub fn loot(&self) -> Result<&'a L, OracleError> {
        self.loot.ok_or(OracleError::LootNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Tile at `position`, treating a missing map like a missing tile.
    pub fn tile(&self, position: crate::Position) -> Option<TileView> {
        self.map.and_then(|map| map.tile(position))
    }
}

impl<'a, M, P, I, L, R> Env<'a, M, P, I, L, R>
where
    M: MapOracle + 'a,
    P: PathOracle + 'a,
    I: ItemOracle + 'a,
    L: LootOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv`.
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let map: Option<&'a dyn MapOracle> = self.map.map(|map| map as _);
        let paths: Option<&'a dyn PathOracle> = self.paths.map(|paths| paths as _);
        let items: Option<&'a dyn ItemOracle> = self.items.map(|items| items as _);
        let loot: Option<&'a dyn LootOracle> = self.loot.map(|loot| loot as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(map, paths, items, loot, rng)
    }
}
