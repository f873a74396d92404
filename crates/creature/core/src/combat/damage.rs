//! Damage types and immunity masks.

use bitflags::bitflags;

/// Damage type of a hit, a field or a damage-over-time condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    /// Melee and distance weapons.
    Physical,
    Energy,
    Poison,
    Fire,
    /// Health drain spells.
    LifeDrain,
    /// Mana drain spells.
    ManaDrain,
    Drown,
}

impl DamageType {
    /// Immunity bit matching this damage type.
    pub const fn flag(self) -> Immunities {
        match self {
            DamageType::Physical => Immunities::PHYSICAL,
            DamageType::Energy => Immunities::ENERGY,
            DamageType::Poison => Immunities::POISON,
            DamageType::Fire => Immunities::FIRE,
            DamageType::LifeDrain => Immunities::LIFE_DRAIN,
            DamageType::ManaDrain => Immunities::MANA_DRAIN,
            DamageType::Drown => Immunities::DROWN,
        }
    }
}

bitflags! {
    /// Set of damage types a creature ignores entirely.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Immunities: u32 {
        const PHYSICAL = 1 << 0;
        const ENERGY = 1 << 1;
        const POISON = 1 << 2;
        const FIRE = 1 << 3;
        const LIFE_DRAIN = 1 << 4;
        const MANA_DRAIN = 1 << 5;
        const DROWN = 1 << 6;
    }
}

impl Immunities {
    /// Mask test: every bit of `damage_type` must be present.
    pub fn is_immune(self, damage_type: DamageType) -> bool {
        self.contains(damage_type.flag())
    }
}
