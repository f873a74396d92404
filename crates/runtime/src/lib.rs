//! Reference host for the creature core.
//!
//! This crate wires an in-memory world, a tick-driven event queue and the
//! oracle implementations into a tokio worker that owns the world
//! exclusively. Consumers embed [`Runtime`] and talk to it through the
//! cloneable [`RuntimeHandle`]; world changes stream out as [`SimEvent`]s.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`world`] implements the core's world contracts
//! - [`oracle`] provides the read-only map, path, item and loot data
//! - [`workers`] keeps the simulation task internal to the crate
pub mod api;
pub mod config;
pub mod oracle;
pub mod runtime;
pub mod telemetry;
pub mod world;

mod workers;

pub use api::{DamageOutcome, Result, RuntimeError, RuntimeHandle, SimEvent};
pub use config::RuntimeConfig;
pub use oracle::{GridMap, ItemCatalog, LootEntry, OracleManager, StraightLinePaths, TableLoot};
pub use runtime::{Runtime, RuntimeBuilder};
pub use telemetry::init_tracing;
pub use world::{EventQueue, InMemoryWorld, WorldChange};
