//! Path search contract.
//!
//! The search itself is a collaborator; this module only fixes the shape of
//! its inputs and results.

use std::collections::VecDeque;

use crate::error::{ErrorSeverity, GameError};
use crate::types::{Direction, Position};

/// Ordered sequence of steps, consumed from the front one per walk event.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkPath {
    steps: VecDeque<Direction>,
}

impl WalkPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, direction: Direction) {
        self.steps.push_back(direction);
    }

    pub fn pop_front(&mut self) -> Option<Direction> {
        self.steps.pop_front()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Direction> {
        self.steps.iter()
    }

    /// Position reached after walking every remaining step from `from`.
    pub fn destination(&self, from: Position) -> Position {
        self.steps.iter().fold(from, |pos, dir| pos.step(*dir))
    }
}

impl FromIterator<Direction> for WalkPath {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[Direction; N]> for WalkPath {
    fn from(steps: [Direction; N]) -> Self {
        steps.into_iter().collect()
    }
}

/// Search parameters: acceptable final distance to the target and search bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FindPathParams {
    pub min_distance: u32,
    pub max_distance: u32,
    /// Every tile along the path must be free of creatures.
    pub must_be_clear: bool,
    /// Give up beyond this many tiles from the origin.
    pub max_search_distance: u32,
}

impl FindPathParams {
    /// Parameters used when following at a fixed distance.
    pub const fn follow(distance: u32, max_search_distance: u32) -> Self {
        Self {
            min_distance: distance,
            max_distance: distance,
            must_be_clear: true,
            max_search_distance,
        }
    }

    pub fn accepts(&self, distance: u32) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }
}

/// Path search oracle.
pub trait PathOracle: Send + Sync {
    fn find_path(
        &self,
        from: Position,
        to: Position,
        params: FindPathParams,
    ) -> Result<WalkPath, PathError>;

    /// Whether `path`, walked from `from`, still ends at an acceptable distance from `to`.
    fn is_path_valid(
        &self,
        from: Position,
        path: &WalkPath,
        to: Position,
        params: FindPathParams,
    ) -> bool {
        params.accepts(path.destination(from).distance(to))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    NoPath { from: Position, to: Position },

    #[error("target {to} is beyond search distance {max} from {from}")]
    OutOfRange { from: Position, to: Position, max: u32 },
}

impl GameError for PathError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            PathError::NoPath { .. } => "PATH_NO_PATH",
            PathError::OutOfRange { .. } => "PATH_OUT_OF_RANGE",
        }
    }
}
