//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers one async helper per
//! creature operation. Every call is answered once the worker has run the
//! operation to completion, including the deaths and removals it caused.
use tokio::sync::{broadcast, mpsc, oneshot};

use creature_core::{
    BlockType, Condition, ConditionType, CreatureId, CreatureSnapshot, CreatureTemplate,
    DamageType, Position, Tick, WalkPath,
};

use super::errors::{Result, RuntimeError};
use super::events::SimEvent;
use crate::workers::Command;

/// How a hit sent through [`RuntimeHandle::damage`] was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub block: BlockType,
    /// Health actually lost.
    pub dealt: u32,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<SimEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<SimEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Places a creature built from `template` and starts its think cycle.
    pub async fn spawn(
        &self,
        template: CreatureTemplate,
        position: Position,
    ) -> Result<CreatureId> {
        self.request(|reply| Command::Spawn {
            template,
            position,
            reply,
        })
        .await?
    }

    /// Spawns a creature as a summon of `master`.
    pub async fn summon(
        &self,
        master: CreatureId,
        template: CreatureTemplate,
        position: Position,
    ) -> Result<CreatureId> {
        self.request(|reply| Command::Summon {
            master,
            template,
            position,
            reply,
        })
        .await?
    }

    /// Replaces the walk path; returns whether a walk event is pending.
    pub async fn walk(&self, creature: CreatureId, path: WalkPath) -> Result<bool> {
        self.request(|reply| Command::Walk {
            creature,
            path,
            reply,
        })
        .await?
    }

    /// Starts (or with `None` stops) following; `false` when no path exists.
    pub async fn follow(&self, creature: CreatureId, target: Option<CreatureId>) -> Result<bool> {
        self.request(|reply| Command::Follow {
            creature,
            target,
            reply,
        })
        .await?
    }

    pub async fn attack(&self, creature: CreatureId, target: Option<CreatureId>) -> Result<()> {
        self.request(|reply| Command::Attack {
            creature,
            target,
            reply,
        })
        .await?
    }

    /// Resolves a hit on `target` with every block check enabled.
    pub async fn damage(
        &self,
        target: CreatureId,
        attacker: Option<CreatureId>,
        damage_type: DamageType,
        amount: u32,
    ) -> Result<DamageOutcome> {
        self.request(|reply| Command::Damage {
            target,
            attacker,
            damage_type,
            amount,
            reply,
        })
        .await?
    }

    pub async fn add_condition(&self, creature: CreatureId, condition: Condition) -> Result<bool> {
        self.request(|reply| Command::AddCondition {
            creature,
            condition,
            reply,
        })
        .await?
    }

    pub async fn remove_condition(
        &self,
        creature: CreatureId,
        kind: ConditionType,
    ) -> Result<bool> {
        self.request(|reply| Command::RemoveCondition {
            creature,
            kind,
            reply,
        })
        .await?
    }

    pub async fn remove(&self, creature: CreatureId) -> Result<()> {
        self.request(|reply| Command::Remove { creature, reply }).await?
    }

    /// Runs the simulation `ticks` ticks forward and returns the new time.
    pub async fn advance(&self, ticks: u64) -> Result<Tick> {
        self.request(|reply| Command::Advance { ticks, reply }).await?
    }

    /// Snapshot of one creature, removed ones included until they are reclaimed.
    pub async fn query(&self, creature: CreatureId) -> Result<CreatureSnapshot> {
        self.request(|reply| Command::Query { creature, reply }).await?
    }

    pub async fn creatures(&self) -> Result<Vec<CreatureSnapshot>> {
        self.request(|reply| Command::QueryAll { reply }).await
    }

    pub async fn position(&self, creature: CreatureId) -> Result<Position> {
        self.request(|reply| Command::Locate { creature, reply }).await?
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
