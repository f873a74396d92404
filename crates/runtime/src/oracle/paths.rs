//! Greedy path finding served through [`creature_core::PathOracle`].
use std::sync::Arc;

use creature_core::{Direction, FindPathParams, PathError, PathOracle, Position, WalkPath};

use super::GridMap;

/// Walks straight at the target, side-stepping single obstacles.
///
/// Each step prefers the diagonal towards the target and falls back to the
/// two axis-aligned steps. Creatures are not obstacles here; the mover
/// rejects occupied tiles and the follow logic recomputes on the next think.
#[derive(Debug, Clone)]
pub struct StraightLinePaths {
    map: Arc<GridMap>,
}

impl StraightLinePaths {
    pub fn new(map: Arc<GridMap>) -> Self {
        Self { map }
    }

    fn next_step(&self, current: Position, to: Position) -> Option<Direction> {
        let dx = (to.x - current.x).signum();
        let dy = (to.y - current.y).signum();
        [(dx, dy), (dx, 0), (0, dy)]
            .into_iter()
            .filter_map(|(x, y)| Direction::from_delta(x, y))
            .find(|direction| self.map.is_walkable(current.step(*direction)))
    }
}

impl PathOracle for StraightLinePaths {
    fn find_path(
        &self,
        from: Position,
        to: Position,
        params: FindPathParams,
    ) -> Result<WalkPath, PathError> {
        let max = params.max_search_distance;
        if from.distance(to) > max {
            return Err(PathError::OutOfRange { from, to, max });
        }

        let mut path = WalkPath::new();
        let mut current = from;
        while !params.accepts(current.distance(to)) {
            if current.distance(to) < params.min_distance || path.len() > 2 * max as usize {
                return Err(PathError::NoPath { from, to });
            }
            let direction = self
                .next_step(current, to)
                .ok_or(PathError::NoPath { from, to })?;
            current = current.step(direction);
            path.push(direction);
        }
        Ok(path)
    }

    fn is_path_valid(
        &self,
        from: Position,
        path: &WalkPath,
        to: Position,
        params: FindPathParams,
    ) -> bool {
        let mut current = from;
        for direction in path.iter() {
            current = current.step(*direction);
            if !self.map.is_walkable(current) {
                return false;
            }
        }
        params.accepts(current.distance(to))
    }
}
