//! Turf Engine - Weekly Settlement
//!
//! The batch half of the territory control engine. Once per concluded
//! ISO week an external scheduler triggers a settlement run, which:
//!
//! 1. Discovers every tile with ledger entries for the period that has no
//!    settlement record yet (the history table is the idempotence guard)
//! 2. Picks each tile's winner deterministically (`turf-core` scoring)
//! 3. Appends the history row and flips ownership in one per-tile
//!    transaction
//! 4. Publishes a `TerritorySettled` event for collaborators (achievement
//!    checks subscribe at startup)
//!
//! A tile failure is recorded in the run report and retried on the next
//! invocation; it never aborts the batch. Runs are bounded by
//! [`SettlementConfig::max_run_duration`] and interrupted runs resume
//! where they left off.

pub mod error;
pub mod events;
pub mod settlement;

pub use error::{EngineError, EngineResult};
pub use events::{spawn_listener, EventBus, SettlementListener, TerritoryEvent};
pub use settlement::{
    SettlementConfig, SettlementEngine, SettlementReport, TileOutcome, TileOutcomeStatus,
};
