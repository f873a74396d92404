use crate::combat::DamageType;
use crate::types::Position;

/// Read-only tile lookup.
pub trait MapOracle: Send + Sync {
    fn tile(&self, position: Position) -> Option<TileView>;
}

/// What the creature layer needs to know about a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileView {
    /// Speed factor of the ground item; zero means "use the default step".
    pub ground_speed: u16,

    /// Damage type of the active magic field on the tile, if any.
    pub field: Option<DamageType>,

    /// Whether creatures may stand on this tile.
    pub walkable: bool,
}

impl TileView {
    pub const fn ground(ground_speed: u16) -> Self {
        Self {
            ground_speed,
            field: None,
            walkable: true,
        }
    }

    pub const fn blocking() -> Self {
        Self {
            ground_speed: 0,
            field: None,
            walkable: false,
        }
    }

    pub const fn with_field(mut self, field: DamageType) -> Self {
        self.field = Some(field);
        self
    }
}
