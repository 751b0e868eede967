//! Territory History Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turf_core::{GuildId, PeriodKey, TileId};

/// Append-only settlement record: one row per (tile, period), written
/// exactly once. Doubles as the audit trail and the idempotence guard for
/// re-running settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerritoryHistoryEntity {
    /// Settled tile
    pub tile_id: TileId,
    /// Guild that won the period
    pub winning_guild_id: GuildId,
    /// Concluded contest window
    pub period: PeriodKey,
    /// When settlement ran
    pub settled_at: DateTime<Utc>,
}

impl TerritoryHistoryEntity {
    pub fn new(
        tile_id: TileId,
        winning_guild_id: GuildId,
        period: PeriodKey,
        settled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tile_id,
            winning_guild_id,
            period,
            settled_at,
        }
    }
}
