//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};
use crate::types::Position;

/// Errors that occur when accessing oracle data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("MapOracle not available")]
    MapNotAvailable,

    #[error("PathOracle not available")]
    PathsNotAvailable,

    #[error("ItemOracle not available")]
    ItemsNotAvailable,

    #[error("LootOracle not available")]
    LootNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("tile at position {0:?} not found")]
    TileNotFound(Position),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            MapNotAvailable | PathsNotAvailable | ItemsNotAvailable | LootNotAvailable
            | RngNotAvailable => ErrorSeverity::Fatal,
            TileNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            MapNotAvailable => "ORACLE_MAP_NOT_AVAILABLE",
            PathsNotAvailable => "ORACLE_PATHS_NOT_AVAILABLE",
            ItemsNotAvailable => "ORACLE_ITEMS_NOT_AVAILABLE",
            LootNotAvailable => "ORACLE_LOOT_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            TileNotFound(_) => "ORACLE_TILE_NOT_FOUND",
        }
    }
}
