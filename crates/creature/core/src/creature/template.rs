//! Data-driven creature definitions.
//!
//! A [`CreatureTemplate`] holds every per-variant value the capability
//! interface asks for. Templates deserialize from RON (behind the `serde`
//! feature) and spawn creatures backed by a [`TemplateBehavior`].

use std::sync::Arc;

use super::{Creature, CreatureBehavior, CreatureKind};
use crate::combat::Immunities;
use crate::config::GameConfig;
use crate::env::ItemTypeId;
use crate::types::{CreatureId, LightInfo};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CreatureTemplate {
    pub name: String,
    pub kind: CreatureKind,
    /// Look text; `None` means "a <name>".
    pub description: Option<String>,
    pub health: u32,
    pub mana: u32,
    pub speed: u32,
    pub defense: u32,
    pub armor: u32,
    pub immunities: Immunities,
    pub lost_experience: u64,
    pub corpse: Option<ItemTypeId>,
    pub light: LightInfo,
    /// `None` keeps [`GameConfig::default_follow_distance`].
    pub follow_distance: Option<u32>,
}

impl Default for CreatureTemplate {
    fn default() -> Self {
        Self {
            name: String::from("creature"),
            kind: CreatureKind::Generic,
            description: None,
            health: 100,
            mana: 0,
            speed: 220,
            defense: 0,
            armor: 0,
            immunities: Immunities::empty(),
            lost_experience: 0,
            corpse: None,
            light: LightInfo::NONE,
            follow_distance: None,
        }
    }
}

impl CreatureTemplate {
    /// Creates a creature from this template with full vitals.
    pub fn to_creature(&self, id: CreatureId, config: &GameConfig) -> Creature {
        Creature::new(id, self.name.clone(), Arc::new(TemplateBehavior::new(self.clone())))
            .with_health(self.health)
            .with_mana(self.mana)
            .with_speed(self.speed)
            .with_light(self.light)
            .with_follow_distance(self.follow_distance.unwrap_or(config.default_follow_distance))
    }

    pub fn builder() -> CreatureTemplateBuilder {
        CreatureTemplateBuilder::default()
    }
}

/// Builder for constructing creature templates.
#[derive(Default)]
pub struct CreatureTemplateBuilder {
    template: CreatureTemplate,
}

impl CreatureTemplateBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.template.name = name.into();
        self
    }

    pub fn kind(mut self, kind: CreatureKind) -> Self {
        self.template.kind = kind;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.template.description = Some(description.into());
        self
    }

    pub fn health(mut self, health: u32) -> Self {
        self.template.health = health;
        self
    }

    pub fn mana(mut self, mana: u32) -> Self {
        self.template.mana = mana;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.template.speed = speed;
        self
    }

    pub fn defense(mut self, defense: u32) -> Self {
        self.template.defense = defense;
        self
    }

    pub fn armor(mut self, armor: u32) -> Self {
        self.template.armor = armor;
        self
    }

    pub fn immunities(mut self, immunities: Immunities) -> Self {
        self.template.immunities = immunities;
        self
    }

    pub fn lost_experience(mut self, experience: u64) -> Self {
        self.template.lost_experience = experience;
        self
    }

    pub fn corpse(mut self, corpse: ItemTypeId) -> Self {
        self.template.corpse = Some(corpse);
        self
    }

    pub fn light(mut self, light: LightInfo) -> Self {
        self.template.light = light;
        self
    }

    pub fn follow_distance(mut self, distance: u32) -> Self {
        self.template.follow_distance = Some(distance);
        self
    }

    pub fn build(self) -> CreatureTemplate {
        self.template
    }
}

/// Capability interface answered from template data; reaction hooks keep
/// their defaults.
#[derive(Clone, Debug)]
pub struct TemplateBehavior {
    template: CreatureTemplate,
}

impl TemplateBehavior {
    pub fn new(template: CreatureTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &CreatureTemplate {
        &self.template
    }
}

impl CreatureBehavior for TemplateBehavior {
    fn kind(&self) -> CreatureKind {
        self.template.kind
    }

    fn description(&self, _creature: &Creature, _look_distance: u32) -> String {
        match &self.template.description {
            Some(description) => description.clone(),
            None => format!("a {}", self.template.name),
        }
    }

    fn defense(&self, _creature: &Creature) -> u32 {
        self.template.defense
    }

    fn armor(&self, _creature: &Creature) -> u32 {
        self.template.armor
    }

    fn immunities(&self, _creature: &Creature) -> Immunities {
        self.template.immunities
    }

    fn lost_experience(&self, _creature: &Creature) -> u64 {
        self.template.lost_experience
    }

    fn corpse_item(&self, _creature: &Creature) -> Option<ItemTypeId> {
        self.template.corpse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;

    #[test]
    fn template_spawns_full_creature() {
        let template = CreatureTemplate::builder()
            .name("rat")
            .kind(CreatureKind::Monster)
            .health(20)
            .speed(150)
            .immunities(Immunities::POISON)
            .build();

        let rat = template.to_creature(CreatureId(5), &GameConfig::default());
        assert_eq!(rat.name(), "rat");
        assert_eq!(rat.kind(), CreatureKind::Monster);
        assert_eq!(rat.health().current, 20);
        assert_eq!(rat.speed(), 150);
        assert_eq!(rat.description(3), "a rat");
        assert!(rat.behavior().immunities(&rat).is_immune(DamageType::Poison));
    }

    #[test]
    fn explicit_description_wins() {
        let template = CreatureTemplate::builder()
            .name("Sam")
            .kind(CreatureKind::Npc)
            .description("Sam, the blacksmith")
            .build();
        let sam = template.to_creature(CreatureId(6), &GameConfig::default());
        assert_eq!(sam.description(1), "Sam, the blacksmith");
    }

    #[test]
    fn follow_distance_falls_back_to_config() {
        let config = GameConfig {
            default_follow_distance: 4,
            ..GameConfig::default()
        };
        let plain = CreatureTemplate::builder().name("wolf").build();
        assert_eq!(plain.to_creature(CreatureId(7), &config).follow_distance(), 4);

        let pinned = CreatureTemplate::builder().name("wolf").follow_distance(2).build();
        assert_eq!(pinned.to_creature(CreatureId(8), &config).follow_distance(), 2);
    }
}
