//! Simulation worker that owns the authoritative [`InMemoryWorld`].
//!
//! Receives commands from [`crate::RuntimeHandle`], runs each one to
//! completion against the creature core and publishes [`SimEvent`]s. Owning
//! the world exclusively is what serializes every creature operation.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use creature_core::{
    BlockChecks, Condition, ConditionType, CreatureId, CreatureRegistry, CreatureSnapshot,
    CreatureTemplate, DamageType, GameConfig, MoveExecutor, Position, SimContext, Tick, WalkPath,
    add_condition, add_summon, block_hit, dispatch, drain_health, internal_follow_creature,
    on_creature_appear, on_creature_disappear, on_creature_move, remove_condition,
    remove_creature, set_attacked_creature, start_auto_walk, start_thinking,
};

use crate::api::{DamageOutcome, Result, RuntimeError, SimEvent};
use crate::oracle::OracleManager;
use crate::world::{InMemoryWorld, WorldChange};

/// Upper bound of events handled by one clock advance.
const MAX_EVENTS_PER_ADVANCE: usize = 100_000;

/// Commands that can be sent to the simulation worker
pub enum Command {
    Spawn {
        template: CreatureTemplate,
        position: Position,
        reply: oneshot::Sender<Result<CreatureId>>,
    },
    /// Spawn a creature and bind it to `master`.
    Summon {
        master: CreatureId,
        template: CreatureTemplate,
        position: Position,
        reply: oneshot::Sender<Result<CreatureId>>,
    },
    Walk {
        creature: CreatureId,
        path: WalkPath,
        reply: oneshot::Sender<Result<bool>>,
    },
    Follow {
        creature: CreatureId,
        target: Option<CreatureId>,
        reply: oneshot::Sender<Result<bool>>,
    },
    Attack {
        creature: CreatureId,
        target: Option<CreatureId>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Resolve a hit through blocking, then drain what got through.
    Damage {
        target: CreatureId,
        attacker: Option<CreatureId>,
        damage_type: DamageType,
        amount: u32,
        reply: oneshot::Sender<Result<DamageOutcome>>,
    },
    AddCondition {
        creature: CreatureId,
        condition: Condition,
        reply: oneshot::Sender<Result<bool>>,
    },
    RemoveCondition {
        creature: CreatureId,
        kind: ConditionType,
        reply: oneshot::Sender<Result<bool>>,
    },
    Remove {
        creature: CreatureId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Run every event due within the next `ticks` ticks.
    Advance {
        ticks: u64,
        reply: oneshot::Sender<Result<Tick>>,
    },
    Query {
        creature: CreatureId,
        reply: oneshot::Sender<Result<CreatureSnapshot>>,
    },
    QueryAll {
        reply: oneshot::Sender<Vec<CreatureSnapshot>>,
    },
    Locate {
        creature: CreatureId,
        reply: oneshot::Sender<Result<Position>>,
    },
    Shutdown,
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    world: InMemoryWorld,
    oracles: OracleManager,
    config: GameConfig,
    game_seed: u64,
    tick_millis: u64,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<SimEvent>,
}

impl SimulationWorker {
    pub fn new(
        world: InMemoryWorld,
        oracles: OracleManager,
        config: GameConfig,
        game_seed: u64,
        tick_millis: u64,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<SimEvent>,
    ) -> Self {
        Self {
            world,
            oracles,
            config,
            game_seed,
            tick_millis,
            command_rx,
            event_tx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut clock = (self.tick_millis > 0).then(|| {
            let mut interval = tokio::time::interval(Duration::from_millis(self.tick_millis));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = next_tick(&mut clock) => {
                    let ticks = self.tick_millis;
                    self.advance(ticks);
                }
            }
        }

        self.world.close();
        info!(
            target: "runtime::worker",
            now = %self.world.queue().now(),
            "simulation worker stopped"
        );
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Spawn {
                template,
                position,
                reply,
            } => respond(reply, self.spawn(&template, position)),
            Command::Summon {
                master,
                template,
                position,
                reply,
            } => respond(reply, self.summon(master, &template, position)),
            Command::Walk {
                creature,
                path,
                reply,
            } => {
                let result = self.on_live(creature, |ctx| start_auto_walk(ctx, creature, path));
                respond(reply, result);
            }
            Command::Follow {
                creature,
                target,
                reply,
            } => {
                let result = self
                    .on_live(creature, |ctx| internal_follow_creature(ctx, creature, target));
                respond(reply, result);
            }
            Command::Attack {
                creature,
                target,
                reply,
            } => {
                let result =
                    self.on_live(creature, |ctx| set_attacked_creature(ctx, creature, target));
                respond(reply, result);
            }
            Command::Damage {
                target,
                attacker,
                damage_type,
                amount,
                reply,
            } => {
                let result = self.on_live(target, |ctx| {
                    let hit =
                        block_hit(ctx, target, attacker, damage_type, amount, BlockChecks::ALL);
                    let dealt = if hit.is_blocked() {
                        0
                    } else {
                        drain_health(ctx, target, attacker, damage_type, hit.damage)
                    };
                    DamageOutcome {
                        block: hit.block,
                        dealt,
                    }
                });
                respond(reply, result);
            }
            Command::AddCondition {
                creature,
                condition,
                reply,
            } => {
                let result =
                    self.on_live(creature, |ctx| add_condition(ctx, creature, Some(condition)));
                respond(reply, result);
            }
            Command::RemoveCondition {
                creature,
                kind,
                reply,
            } => {
                let result = self.on_live(creature, |ctx| remove_condition(ctx, creature, kind));
                respond(reply, result);
            }
            Command::Remove { creature, reply } => respond(reply, self.remove(creature)),
            Command::Advance { ticks, reply } => respond(reply, Ok(self.advance(ticks))),
            Command::Query { creature, reply } => {
                let result = self
                    .world
                    .creature(creature)
                    .map(|creature| creature.snapshot())
                    .ok_or(RuntimeError::UnknownCreature(creature));
                respond(reply, result);
            }
            Command::QueryAll { reply } => {
                let snapshots = self
                    .world
                    .creature_ids()
                    .into_iter()
                    .filter_map(|id| self.world.creature(id).map(|creature| creature.snapshot()))
                    .collect();
                respond(reply, snapshots);
            }
            Command::Locate { creature, reply } => {
                let result = self
                    .world
                    .position_of(creature)
                    .filter(|_| self.world.is_live(creature))
                    .ok_or(RuntimeError::UnknownCreature(creature));
                respond(reply, result);
            }
            Command::Shutdown => {}
        }
    }

    /// Runs `operation` with a fresh context, then settles the world.
    fn with_context<T>(&mut self, operation: impl FnOnce(&mut SimContext<'_>) -> T) -> T {
        let result = {
            let env = self.oracles.as_game_env();
            let mut ctx =
                SimContext::new(&mut self.world, env, &self.config).with_seed(self.game_seed);
            operation(&mut ctx)
        };
        self.settle();
        result
    }

    fn on_live<T>(
        &mut self,
        creature: CreatureId,
        operation: impl FnOnce(&mut SimContext<'_>) -> T,
    ) -> Result<T> {
        if !self.world.is_live(creature) {
            return Err(RuntimeError::UnknownCreature(creature));
        }
        Ok(self.with_context(operation))
    }

    fn spawn(&mut self, template: &CreatureTemplate, position: Position) -> Result<CreatureId> {
        let id = self.world.allocate_id();
        self.world.insert(template.to_creature(id, &self.config), position)?;

        let spectators = self.world.spectators(position, self.config.view_range);
        self.with_context(|ctx| {
            start_thinking(ctx, id);
            for spectator in spectators.into_iter().filter(|spectator| *spectator != id) {
                on_creature_appear(ctx, spectator, id);
            }
        });

        info!(
            target: "runtime::worker",
            creature = %id,
            name = %template.name,
            %position,
            "spawned"
        );
        self.publish(SimEvent::Spawned {
            creature: id,
            name: template.name.clone(),
            position,
        });
        Ok(id)
    }

    fn summon(
        &mut self,
        master: CreatureId,
        template: &CreatureTemplate,
        position: Position,
    ) -> Result<CreatureId> {
        if !self.world.is_live(master) {
            return Err(RuntimeError::UnknownCreature(master));
        }
        let id = self.spawn(template, position)?;
        if self.with_context(|ctx| add_summon(ctx, master, id)) {
            return Ok(id);
        }
        self.remove(id)?;
        Err(RuntimeError::InvalidSummon(id, master))
    }

    fn remove(&mut self, creature: CreatureId) -> Result<()> {
        let position = self.world.position_of(creature);
        let spectators = position
            .map(|position| self.world.spectators(position, self.config.view_range))
            .unwrap_or_default();

        self.on_live(creature, |ctx| {
            remove_creature(ctx, creature);
            for spectator in spectators.into_iter().filter(|spectator| *spectator != creature) {
                on_creature_disappear(ctx, spectator, creature);
            }
        })?;

        self.publish(SimEvent::Removed { creature });
        self.world.reclaim();
        Ok(())
    }

    /// Fires every event due within `ticks` and moves the clock to the end.
    fn advance(&mut self, ticks: u64) -> Tick {
        let until = self.world.queue().now() + ticks;
        let mut handled = 0;

        while let Some(event) = self.world.pop_due(until) {
            self.with_context(|ctx| dispatch(ctx, event));
            handled += 1;
            if handled >= MAX_EVENTS_PER_ADVANCE {
                warn!(
                    target: "runtime::worker",
                    handled,
                    now = %self.world.queue().now(),
                    "event budget exhausted, resuming on next advance"
                );
                return self.world.queue().now();
            }
        }

        self.world.advance_to(until);
        self.publish(SimEvent::Advanced { now: until });
        until
    }

    /// Reacts to recorded moves and deaths until the outbox stays empty.
    fn settle(&mut self) {
        loop {
            let changes = self.world.take_changes();
            if changes.is_empty() {
                break;
            }
            for change in changes {
                match change {
                    WorldChange::Moved { creature, from, to } => self.moved(creature, from, to),
                    WorldChange::Died(report) => {
                        self.publish(SimEvent::died(&report));
                        if let (Some(position), Some(corpse)) = (report.position, report.corpse) {
                            self.publish(SimEvent::CorpsePlaced { position, corpse });
                        }
                        if let Err(error) = self.remove(report.victim) {
                            debug!(
                                target: "runtime::worker",
                                creature = %report.victim,
                                %error,
                                "victim already gone"
                            );
                        }
                    }
                }
            }
        }
        self.world.reclaim();
    }

    fn moved(&mut self, creature: CreatureId, from: Position, to: Position) {
        let range = self.config.view_range;
        let mut spectators = self.world.spectators(from, range);
        for spectator in self.world.spectators(to, range) {
            if !spectators.contains(&spectator) {
                spectators.push(spectator);
            }
        }

        let env = self.oracles.as_game_env();
        let mut ctx = SimContext::new(&mut self.world, env, &self.config).with_seed(self.game_seed);
        for spectator in spectators {
            on_creature_move(&mut ctx, spectator, creature, from, to);
        }

        self.publish(SimEvent::Moved { creature, from, to });
    }

    fn publish(&self, event: SimEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::worker", "reply channel closed (caller dropped)");
    }
}

async fn next_tick(clock: &mut Option<Interval>) {
    match clock {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
