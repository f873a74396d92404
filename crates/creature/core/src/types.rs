//! Value types shared by every creature subsystem.

use std::fmt;

/// Unique identifier of a creature in the entity registry.
///
/// Relationships between creatures (master, summons, attack and follow
/// targets) are stored as ids and resolved through the registry on every use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureId(pub u32);

impl CreatureId {
    /// Reserved identifier for unattributed damage (fields, drowning, etc.).
    ///
    /// Never assigned to a registered creature.
    pub const ENVIRONMENT: Self = Self(0);

    /// Returns true if this id denotes the environment rather than a creature.
    #[inline]
    pub const fn is_environment(self) -> bool {
        self.0 == Self::ENVIRONMENT.0
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one step away in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance (diagonal steps count as one).
    pub fn distance(self, other: Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Facing and stepping direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
        }
    }

    /// Direction of a single step with the given signed offsets.
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (0, 1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, -1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            (1, 1) => Some(Direction::NorthEast),
            (-1, 1) => Some(Direction::NorthWest),
            (1, -1) => Some(Direction::SouthEast),
            (-1, -1) => Some(Direction::SouthWest),
            _ => None,
        }
    }
}

/// Scheduler time in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Signed distance from `self` to `later`.
    pub fn until(self, later: Tick) -> i64 {
        later.0 as i64 - self.0 as i64
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer resource meter (health, mana) with a hard `[0, maximum]` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub const fn new(current: u32, maximum: u32) -> Self {
        let current = if current > maximum { maximum } else { current };
        Self { current, maximum }
    }

    /// Meter filled to its maximum.
    pub const fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Applies a signed change and returns the amount actually applied.
    ///
    /// Gains never exceed the deficit; losses floor at zero.
    pub fn change(&mut self, delta: i64) -> i64 {
        let before = self.current;
        if delta > 0 {
            let deficit = u64::from(self.maximum - self.current);
            self.current += delta.unsigned_abs().min(deficit) as u32;
        } else {
            let loss = delta.unsigned_abs().min(u64::from(self.current));
            self.current -= loss as u32;
        }
        debug_assert!(self.current <= self.maximum);
        i64::from(self.current) - i64::from(before)
    }

    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }
}

/// Light emitted by a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightInfo {
    pub level: u8,
    pub color: u8,
}

impl LightInfo {
    pub const NONE: Self = Self { level: 0, color: 0 };

    pub const fn new(level: u8, color: u8) -> Self {
        Self { level, color }
    }
}
