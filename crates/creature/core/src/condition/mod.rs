//! Condition engine: timed status effects attached to a creature.
//!
//! A creature carries at most one condition per [`ConditionType`]. Adding a
//! condition of a type that is already active merges the two (see
//! [`Condition::merge`]); everything else about a condition's lifecycle lives
//! in [`engine`], which wires the pure state in this module to the owner's
//! hooks and to combat.

mod engine;
mod list;

pub use engine::{abort_conditions, add_condition, execute_conditions, remove_condition};
pub use list::{AddOutcome, ConditionList};

use strum::EnumCount;

use crate::combat::DamageType;
use crate::types::{CreatureId, LightInfo};

/// Capacity of a creature's condition list: one slot per type.
pub const MAX_CONDITIONS: usize = ConditionType::COUNT;

/// Fixed enumeration of condition types.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumCount, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ConditionType {
    // Damage over time
    Poison,
    Fire,
    Energy,

    // Movement
    Drunk,
    Haste,
    Paralyze,

    // Appearance
    Invisible,
    Light,

    // Combat bookkeeping
    ManaShield,
    InFight,
    Exhausted,

    Regeneration,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Damage type whose magic field keeps this condition from counting down.
    pub const fn field_damage(self) -> Option<DamageType> {
        match self {
            ConditionType::Fire => Some(DamageType::Fire),
            ConditionType::Energy => Some(DamageType::Energy),
            ConditionType::Poison => Some(DamageType::Poison),
            _ => None,
        }
    }
}

/// Why a condition left the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// Remaining ticks reached zero.
    Expired,
    /// Removed explicitly, or the owner went away.
    Aborted,
}

/// Creature attributes that conditions are allowed to modify.
///
/// Conditions apply their effect here on start and revert it on end, so the
/// owner never has to know which conditions are active to compute its speed
/// or light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusModifiers {
    pub speed_delta: i32,
    pub light: LightInfo,
    /// Light restored when a light condition ends.
    pub normal_light: LightInfo,
}

impl StatusModifiers {
    pub fn with_light(light: LightInfo) -> Self {
        Self {
            speed_delta: 0,
            light,
            normal_light: light,
        }
    }
}

/// Per-type effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionEffect {
    /// Pure flag (drunk, invisible, in-fight, ...).
    None,

    /// Damage dealt every `interval` ticks, attributed to `owner`.
    Periodic {
        damage_type: DamageType,
        amount: u32,
        interval: u64,
        elapsed: u64,
        owner: Option<CreatureId>,
    },

    /// Signed change applied to the owner's speed while active.
    Speed { delta: i32 },

    /// Health and mana gained every `interval` ticks.
    Regeneration {
        health: u32,
        mana: u32,
        interval: u64,
        elapsed: u64,
    },

    /// Light emitted while active.
    Light(LightInfo),
}

/// Result of one condition tick that the engine must apply to the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionPulse {
    Damage {
        damage_type: DamageType,
        amount: u32,
        owner: Option<CreatureId>,
    },
    Heal {
        health: u32,
        mana: u32,
    },
}

/// A single status effect with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub kind: ConditionType,
    /// Remaining ticks; [`Condition::PERMANENT`] never counts down.
    pub ticks: i64,
    pub effect: ConditionEffect,
}

impl Condition {
    pub const PERMANENT: i64 = -1;

    /// Flag condition without parameters.
    pub fn generic(kind: ConditionType, ticks: i64) -> Self {
        Self {
            kind,
            ticks,
            effect: ConditionEffect::None,
        }
    }

    fn periodic(
        kind: ConditionType,
        damage_type: DamageType,
        ticks: i64,
        amount: u32,
        interval: u64,
        owner: Option<CreatureId>,
    ) -> Self {
        Self {
            kind,
            ticks,
            effect: ConditionEffect::Periodic {
                damage_type,
                amount,
                interval: interval.max(1),
                elapsed: 0,
                owner,
            },
        }
    }

    pub fn poison(ticks: i64, amount: u32, interval: u64, owner: Option<CreatureId>) -> Self {
        Self::periodic(
            ConditionType::Poison,
            DamageType::Poison,
            ticks,
            amount,
            interval,
            owner,
        )
    }

    pub fn fire(ticks: i64, amount: u32, interval: u64, owner: Option<CreatureId>) -> Self {
        Self::periodic(
            ConditionType::Fire,
            DamageType::Fire,
            ticks,
            amount,
            interval,
            owner,
        )
    }

    pub fn energy(ticks: i64, amount: u32, interval: u64, owner: Option<CreatureId>) -> Self {
        Self::periodic(
            ConditionType::Energy,
            DamageType::Energy,
            ticks,
            amount,
            interval,
            owner,
        )
    }

    pub fn haste(ticks: i64, delta: u32) -> Self {
        Self {
            kind: ConditionType::Haste,
            ticks,
            effect: ConditionEffect::Speed {
                delta: i32::try_from(delta).unwrap_or(i32::MAX),
            },
        }
    }

    pub fn paralyze(ticks: i64, delta: u32) -> Self {
        Self {
            kind: ConditionType::Paralyze,
            ticks,
            effect: ConditionEffect::Speed {
                delta: -i32::try_from(delta).unwrap_or(i32::MAX),
            },
        }
    }

    pub fn regeneration(ticks: i64, health: u32, mana: u32, interval: u64) -> Self {
        Self {
            kind: ConditionType::Regeneration,
            ticks,
            effect: ConditionEffect::Regeneration {
                health,
                mana,
                interval: interval.max(1),
                elapsed: 0,
            },
        }
    }

    pub fn light(ticks: i64, light: LightInfo) -> Self {
        Self {
            kind: ConditionType::Light,
            ticks,
            effect: ConditionEffect::Light(light),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.ticks == Self::PERMANENT
    }

    pub fn is_expired(&self) -> bool {
        !self.is_permanent() && self.ticks <= 0
    }

    /// Activates the effect on the owner. Returns false if the condition is
    /// already spent and must not be added.
    pub fn start(&self, status: &mut StatusModifiers) -> bool {
        if self.is_expired() {
            return false;
        }
        match self.effect {
            ConditionEffect::Speed { delta } => status.speed_delta += delta,
            ConditionEffect::Light(light) => status.light = light,
            ConditionEffect::None
            | ConditionEffect::Periodic { .. }
            | ConditionEffect::Regeneration { .. } => {}
        }
        true
    }

    /// Reverts whatever [`Condition::start`] applied.
    pub fn end(&self, status: &mut StatusModifiers, _reason: EndReason) {
        match self.effect {
            ConditionEffect::Speed { delta } => status.speed_delta -= delta,
            ConditionEffect::Light(_) => status.light = status.normal_light,
            ConditionEffect::None
            | ConditionEffect::Periodic { .. }
            | ConditionEffect::Regeneration { .. } => {}
        }
    }

    /// Combines `other` (same type) into this active condition.
    ///
    /// - speed and light effects are replaced, duration included
    /// - damage over time keeps the stronger amount and the longer duration
    /// - regeneration keeps the larger amounts and the longer duration
    /// - flags keep the longer duration
    pub fn merge(&mut self, other: Condition, status: &mut StatusModifiers) {
        debug_assert_eq!(self.kind, other.kind);

        match (&mut self.effect, other.effect) {
            (ConditionEffect::Speed { delta }, ConditionEffect::Speed { delta: incoming }) => {
                status.speed_delta += incoming - *delta;
                *delta = incoming;
                self.ticks = other.ticks;
            }
            (ConditionEffect::Light(light), ConditionEffect::Light(incoming)) => {
                *light = incoming;
                status.light = incoming;
                self.ticks = other.ticks;
            }
            (
                ConditionEffect::Periodic {
                    amount,
                    interval,
                    owner,
                    ..
                },
                ConditionEffect::Periodic {
                    amount: incoming,
                    interval: incoming_interval,
                    owner: incoming_owner,
                    ..
                },
            ) => {
                if incoming >= *amount {
                    *amount = incoming;
                    *interval = incoming_interval;
                    *owner = incoming_owner;
                }
                self.ticks = longer(self.ticks, other.ticks);
            }
            (
                ConditionEffect::Regeneration { health, mana, .. },
                ConditionEffect::Regeneration {
                    health: incoming_health,
                    mana: incoming_mana,
                    ..
                },
            ) => {
                *health = (*health).max(incoming_health);
                *mana = (*mana).max(incoming_mana);
                self.ticks = longer(self.ticks, other.ticks);
            }
            _ => {
                self.ticks = longer(self.ticks, other.ticks);
            }
        }
    }

    /// Advances the condition by `elapsed` ticks.
    ///
    /// The effect always runs; the remaining duration only shrinks when
    /// `counts_down` is set.
    pub fn execute(&mut self, elapsed: u64, counts_down: bool) -> Option<ConditionPulse> {
        let pulse = match &mut self.effect {
            ConditionEffect::Periodic {
                damage_type,
                amount,
                interval,
                elapsed: acc,
                owner,
            } => {
                let pulses = accumulate(acc, *interval, elapsed);
                (pulses > 0 && *amount > 0).then(|| ConditionPulse::Damage {
                    damage_type: *damage_type,
                    amount: amount.saturating_mul(pulses),
                    owner: *owner,
                })
            }
            ConditionEffect::Regeneration {
                health,
                mana,
                interval,
                elapsed: acc,
            } => {
                let pulses = accumulate(acc, *interval, elapsed);
                (pulses > 0).then(|| ConditionPulse::Heal {
                    health: health.saturating_mul(pulses),
                    mana: mana.saturating_mul(pulses),
                })
            }
            ConditionEffect::None | ConditionEffect::Speed { .. } | ConditionEffect::Light(_) => {
                None
            }
        };

        if counts_down && !self.is_permanent() {
            self.ticks -= i64::try_from(elapsed).unwrap_or(i64::MAX);
        }

        pulse
    }
}

fn longer(current: i64, incoming: i64) -> i64 {
    if current == Condition::PERMANENT || incoming == Condition::PERMANENT {
        Condition::PERMANENT
    } else {
        current.max(incoming)
    }
}

/// Adds `elapsed` to the accumulator and returns how many whole intervals passed.
fn accumulate(acc: &mut u64, interval: u64, elapsed: u64) -> u32 {
    *acc += elapsed;
    let pulses = *acc / interval;
    *acc %= interval;
    u32::try_from(pulses).unwrap_or(u32::MAX)
}
