use arrayvec::ArrayVec;

use super::{Condition, ConditionType, EndReason, MAX_CONDITIONS, StatusModifiers};

/// What happened to a condition handed to [`ConditionList::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// Combined into the active condition of the same type.
    Merged,
    /// Started and appended.
    Started,
    /// Spent before it started; nothing was added.
    Rejected,
}

/// Active conditions of one creature, in insertion order.
///
/// Holds at most one condition per [`ConditionType`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionList {
    conditions: ArrayVec<Condition, MAX_CONDITIONS>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: ConditionType) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }

    pub fn get(&self, kind: ConditionType) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    pub(crate) fn get_mut(&mut self, kind: ConditionType) -> Option<&mut Condition> {
        self.conditions.iter_mut().find(|c| c.kind == kind)
    }

    /// Merges `condition` into an active one of the same type, or starts it.
    pub fn insert(&mut self, condition: Condition, status: &mut StatusModifiers) -> AddOutcome {
        if let Some(existing) = self.get_mut(condition.kind) {
            existing.merge(condition, status);
            return AddOutcome::Merged;
        }

        if !condition.start(status) {
            return AddOutcome::Rejected;
        }

        // One slot per type, so a missing type always fits.
        debug_assert!(!self.conditions.is_full());
        self.conditions.push(condition);
        AddOutcome::Started
    }

    /// Ends and removes the first condition of `kind`.
    pub fn remove(
        &mut self,
        kind: ConditionType,
        status: &mut StatusModifiers,
        reason: EndReason,
    ) -> Option<Condition> {
        let index = self.conditions.iter().position(|c| c.kind == kind)?;
        let condition = self.conditions.remove(index);
        condition.end(status, reason);
        Some(condition)
    }

    /// Ends every condition with [`EndReason::Aborted`] and empties the list.
    pub fn abort_all(
        &mut self,
        status: &mut StatusModifiers,
    ) -> ArrayVec<ConditionType, MAX_CONDITIONS> {
        let mut ended = ArrayVec::new();
        for condition in self.conditions.drain(..) {
            condition.end(status, EndReason::Aborted);
            ended.push(condition.kind);
        }
        ended
    }

    /// Types currently active, in insertion order.
    pub fn kinds(&self) -> ArrayVec<ConditionType, MAX_CONDITIONS> {
        self.conditions.iter().map(|c| c.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
