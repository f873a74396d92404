//! Bounded grid served through [`creature_core::MapOracle`].
use std::collections::HashMap;

use creature_core::{DamageType, MapOracle, Position, TileView};

/// Rectangular map anchored at the origin.
///
/// Every in-bounds tile uses the default tile unless overridden. Positions
/// outside `0..width` x `0..height` have no tile at all.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: u32,
    height: u32,
    default: TileView,
    tiles: HashMap<Position, TileView>,
}

impl GridMap {
    pub fn new(width: u32, height: u32, default: TileView) -> Self {
        Self {
            width,
            height,
            default,
            tiles: HashMap::new(),
        }
    }

    /// All-floor map whose ground speed leaves step timing at the configured default.
    pub fn open_field(width: u32, height: u32) -> Self {
        Self::new(width, height, TileView::ground(0))
    }

    pub fn with_tile(mut self, position: Position, tile: TileView) -> Self {
        self.tiles.insert(position, tile);
        self
    }

    pub fn with_wall(self, position: Position) -> Self {
        self.with_tile(position, TileView::blocking())
    }

    /// Places a magic field of `damage_type` on an otherwise default tile.
    pub fn with_field(self, position: Position, damage_type: DamageType) -> Self {
        let tile = self.default.with_field(damage_type);
        self.with_tile(position, tile)
    }

    pub fn contains(&self, position: Position) -> bool {
        u32::try_from(position.x).is_ok_and(|x| x < self.width)
            && u32::try_from(position.y).is_ok_and(|y| y < self.height)
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(|tile| tile.walkable)
    }
}

impl MapOracle for GridMap {
    fn tile(&self, position: Position) -> Option<TileView> {
        if !self.contains(position) {
            return None;
        }
        Some(self.tiles.get(&position).copied().unwrap_or(self.default))
    }
}
