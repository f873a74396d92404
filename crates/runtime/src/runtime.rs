//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the simulation.

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{Result, RuntimeError, RuntimeHandle, SimEvent};
use crate::config::RuntimeConfig;
use crate::oracle::OracleManager;
use crate::workers::{Command, SimulationWorker};
use crate::world::InMemoryWorld;

/// Main runtime that orchestrates the creature simulation
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade
/// for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.handle.subscribe()
    }

    /// Stops the worker after the commands already queued and waits for it.
    ///
    /// Handles still held by clients fail with
    /// [`RuntimeError::CommandChannelClosed`] afterwards.
    pub async fn shutdown(self) -> Result<()> {
        // A worker that already stopped has nothing left to flush.
        let _ = self.handle.shutdown().await;

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Build the runtime and spawn its worker on the current tokio runtime
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let config = self.config;
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let (event_tx, _event_rx) = broadcast::channel::<SimEvent>(config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_tx.clone());
        let world = InMemoryWorld::new(oracles.map());

        let sim_worker = SimulationWorker::new(
            world,
            oracles,
            config.game_config,
            config.game_seed,
            config.tick_millis,
            command_rx,
            event_tx,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        info!(
            target: "runtime::worker",
            seed = config.game_seed,
            tick_millis = config.tick_millis,
            "runtime started"
        );

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
