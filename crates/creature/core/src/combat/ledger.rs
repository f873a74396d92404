//! Per-creature record of damage received, keyed by attacker.

use std::collections::BTreeMap;

use crate::types::CreatureId;

/// Cumulative damage taken per attacker since the creature was created.
///
/// Entries only grow. Iteration is in ascending attacker id, which is the
/// order killer resolution walks the ledger in. Environmental damage is kept
/// under [`CreatureId::ENVIRONMENT`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageLedger {
    entries: BTreeMap<CreatureId, u64>,
    last_hit: Option<CreatureId>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `points` of damage dealt by `attacker` (or the environment).
    ///
    /// Zero-point hits leave both the totals and the last-hit attribution untouched.
    pub fn record(&mut self, attacker: Option<CreatureId>, points: u32) -> bool {
        if points == 0 {
            return false;
        }
        let attacker = attacker.unwrap_or(CreatureId::ENVIRONMENT);
        *self.entries.entry(attacker).or_insert(0) += u64::from(points);
        self.last_hit = Some(attacker);
        true
    }

    /// Attacker recorded most recently.
    pub fn last_hit(&self) -> Option<CreatureId> {
        self.last_hit
    }

    pub fn damage_by(&self, attacker: CreatureId) -> u64 {
        self.entries.get(&attacker).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (CreatureId, u64)> + '_ {
        self.entries.iter().map(|(id, damage)| (*id, *damage))
    }

    pub fn attackers(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Experience owed to `attacker`: `floor(lost_experience * share / total)`.
    pub fn experience_share(&self, attacker: CreatureId, lost_experience: u64) -> u64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let share = u128::from(self.damage_by(attacker));
        (u128::from(lost_experience) * share / u128::from(total)) as u64
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.last_hit = None;
    }
}
