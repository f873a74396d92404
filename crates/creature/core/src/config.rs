/// Creature simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Step duration used when the current tile has no ground speed modifier.
    pub default_step_duration: u64,

    /// Speed substituted for a creature whose speed is zero.
    pub fallback_speed: u32,

    /// Interval between think-ticks (condition ticking, follow revalidation).
    pub think_interval: u64,

    /// Distance kept from a followed creature.
    pub default_follow_distance: u32,

    /// Half extents of the area a creature keeps track of.
    pub view_range: ViewRange,

    /// Divisor of the armor reduction formula.
    pub armor_divisor: u32,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Maximum search radius handed to the path oracle when following.
    pub const MAX_FOLLOW_SEARCH: u32 = 12;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STEP_DURATION: u64 = 500;
    pub const DEFAULT_FALLBACK_SPEED: u32 = 220;
    pub const DEFAULT_THINK_INTERVAL: u64 = 1000;
    pub const DEFAULT_FOLLOW_DISTANCE: u32 = 1;
    pub const DEFAULT_ARMOR_DIVISOR: u32 = 3000;

    pub fn new() -> Self {
        Self {
            default_step_duration: Self::DEFAULT_STEP_DURATION,
            fallback_speed: Self::DEFAULT_FALLBACK_SPEED,
            think_interval: Self::DEFAULT_THINK_INTERVAL,
            default_follow_distance: Self::DEFAULT_FOLLOW_DISTANCE,
            view_range: ViewRange::default(),
            armor_divisor: Self::DEFAULT_ARMOR_DIVISOR,
        }
    }

    pub fn with_think_interval(mut self, think_interval: u64) -> Self {
        self.think_interval = think_interval;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Half extents of a creature's tracked area, in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewRange {
    pub x: u32,
    pub y: u32,
}

impl ViewRange {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn contains(&self, from: crate::Position, to: crate::Position) -> bool {
        (from.x - to.x).unsigned_abs() <= self.x && (from.y - to.y).unsigned_abs() <= self.y
    }
}

impl Default for ViewRange {
    fn default() -> Self {
        Self::new(8, 6)
    }
}
