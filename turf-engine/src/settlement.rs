//! Settlement Processing
//!
//! Resolves concluded tile contests into ownership changes and audit
//! records. Per-tile work is independent: each tile settles in its own
//! transaction, failures are quarantined into the run report, and the
//! history table's primary key makes repeated or concurrent runs
//! harmless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use turf_core::{select_winner, GuildId, PeriodKey, TileId};
use turf_store::{SettlementService, TerritoryDatabase};

use crate::error::EngineResult;
use crate::events::{EventBus, TerritoryEvent};

/// Settlement run configuration
#[derive(Clone, Debug)]
pub struct SettlementConfig {
    /// Wall-clock budget for one run; tiles not reached are deferred to
    /// the next invocation
    pub max_run_duration: Duration,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            max_run_duration: Duration::from_secs(300),
        }
    }
}

/// Weekly settlement engine
pub struct SettlementEngine {
    db: Arc<TerritoryDatabase>,
    config: SettlementConfig,
    events: EventBus,
}

impl SettlementEngine {
    pub fn new(db: Arc<TerritoryDatabase>, events: EventBus) -> Self {
        Self {
            db,
            config: SettlementConfig::default(),
            events,
        }
    }

    pub fn with_config(mut self, config: SettlementConfig) -> Self {
        self.config = config;
        self
    }

    /// Settle the most recently concluded period
    pub fn run_concluded(&self, now: DateTime<Utc>) -> EngineResult<SettlementReport> {
        self.run(PeriodKey::concluded(now), now)
    }

    /// Settle one period. Safe to call repeatedly: already-settled tiles
    /// are skipped by the idempotence guard.
    pub fn run(&self, period: PeriodKey, now: DateTime<Utc>) -> EngineResult<SettlementReport> {
        let clock = Instant::now();
        let settlement = self.db.settlement_service();

        let candidates = settlement.unsettled_tiles(period)?;
        let mut report = SettlementReport::new(period, now);
        report.candidates = candidates.len();
        tracing::info!(period = %period, candidates = report.candidates, "settlement run started");

        for tile_id in candidates {
            if clock.elapsed() >= self.config.max_run_duration {
                report.push(TileOutcome {
                    tile_id,
                    status: TileOutcomeStatus::Deferred,
                    winning_guild_id: None,
                    detail: Some("run duration budget exhausted".to_string()),
                });
                continue;
            }

            match self.settle_one(&settlement, &tile_id, period) {
                Ok(Some((winner, settled_at))) => {
                    self.events.publish(TerritoryEvent::TerritorySettled {
                        tile_id: tile_id.clone(),
                        winning_guild_id: winner.clone(),
                        period,
                        settled_at,
                    });
                    report.push(TileOutcome {
                        tile_id,
                        status: TileOutcomeStatus::Settled,
                        winning_guild_id: Some(winner),
                        detail: None,
                    });
                }
                Ok(None) => report.push(TileOutcome {
                    tile_id,
                    status: TileOutcomeStatus::Skipped,
                    winning_guild_id: None,
                    detail: Some("already settled".to_string()),
                }),
                Err(err) => {
                    tracing::warn!(tile = tile_id.as_str(), error = %err, "tile settlement failed");
                    report.push(TileOutcome {
                        tile_id,
                        status: TileOutcomeStatus::Failed,
                        winning_guild_id: None,
                        detail: Some(err.to_string()),
                    });
                }
            }
        }

        report.finish(Utc::now());
        tracing::info!(
            period = %period,
            settled = report.settled,
            skipped = report.skipped,
            failed = report.failed,
            deferred = report.deferred,
            "settlement run finished"
        );
        Ok(report)
    }

    fn settle_one(
        &self,
        settlement: &SettlementService,
        tile_id: &TileId,
        period: PeriodKey,
    ) -> EngineResult<Option<(GuildId, DateTime<Utc>)>> {
        let standings = settlement.standings(tile_id, period)?;
        let winner = match select_winner(&standings) {
            Some(winner) => winner.guild_id.clone(),
            // Candidate discovery guarantees entries, but a concurrent run
            // may have consumed them between queries
            None => return Ok(None),
        };

        let settled_at = Utc::now();
        if settlement.settle_tile(tile_id, &winner, period, settled_at)? {
            Ok(Some((winner, settled_at)))
        } else {
            Ok(None)
        }
    }
}

/// Per-tile settlement outcome status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOutcomeStatus {
    /// Ownership finalized in this run
    Settled,
    /// Another run already settled this tile for the period
    Skipped,
    /// Transient failure; retried on the next invocation
    Failed,
    /// Run duration budget exhausted before this tile was reached
    Deferred,
}

/// Per-tile settlement outcome
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileOutcome {
    pub tile_id: TileId,
    pub status: TileOutcomeStatus,
    pub winning_guild_id: Option<GuildId>,
    pub detail: Option<String>,
}

/// Structured report for one settlement run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Settled period
    pub period: PeriodKey,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: Option<DateTime<Utc>>,
    /// Tiles eligible at the start of the run
    pub candidates: usize,
    /// Tiles settled by this run
    pub settled: usize,
    /// Tiles found already settled
    pub skipped: usize,
    /// Tiles that failed and will be retried
    pub failed: usize,
    /// Tiles deferred by the duration budget
    pub deferred: usize,
    /// Per-tile outcomes
    pub outcomes: Vec<TileOutcome>,
    /// Digest over the run summary
    pub report_digest: String,
}

impl SettlementReport {
    pub fn new(period: PeriodKey, started_at: DateTime<Utc>) -> Self {
        Self {
            period,
            started_at,
            finished_at: None,
            candidates: 0,
            settled: 0,
            skipped: 0,
            failed: 0,
            deferred: 0,
            outcomes: Vec::new(),
            report_digest: String::new(),
        }
    }

    fn push(&mut self, outcome: TileOutcome) {
        match outcome.status {
            TileOutcomeStatus::Settled => self.settled += 1,
            TileOutcomeStatus::Skipped => self.skipped += 1,
            TileOutcomeStatus::Failed => self.failed += 1,
            TileOutcomeStatus::Deferred => self.deferred += 1,
        }
        self.outcomes.push(outcome);
    }

    fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
        self.report_digest = self.compute_digest();
    }

    /// Digest over period, counts and per-tile winners
    fn compute_digest(&self) -> String {
        let summary = format!(
            "{}:{}:{}:{}:{}:{}",
            self.period.label(),
            self.candidates,
            self.settled,
            self.skipped,
            self.failed,
            self.deferred,
        );
        let mut hasher = Sha256::new();
        hasher.update(summary.as_bytes());
        for outcome in &self.outcomes {
            hasher.update(outcome.tile_id.as_str().as_bytes());
            if let Some(winner) = &outcome.winning_guild_id {
                hasher.update(winner.as_str().as_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }

    /// True when every candidate was handled without failure or deferral
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.deferred == 0
    }
}
