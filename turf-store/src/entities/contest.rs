//! Contest Entry Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turf_core::{ContestStanding, GuildId, PeriodKey, TileId};

/// One guild's ledger entry for a (tile, period) contest.
///
/// Exactly one row may exist per `(tile_id, guild_id, period)`; counters
/// only increase while the period is open and freeze when it concludes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContestEntryEntity {
    /// Contested tile
    pub tile_id: TileId,
    /// Contesting guild
    pub guild_id: GuildId,
    /// Contest window
    pub period: PeriodKey,
    /// Number of qualifying workouts recorded
    pub workout_count: i64,
    /// Sum of workout volume
    pub total_volume: i64,
    /// Sum of experience earned
    pub xp_earned: i64,
    /// When the contest was opened
    pub created_at: DateTime<Utc>,
}

impl ContestEntryEntity {
    /// Zeroed entry written by the contest opener
    pub fn new(tile_id: TileId, guild_id: GuildId, period: PeriodKey, now: DateTime<Utc>) -> Self {
        Self {
            tile_id,
            guild_id,
            period,
            workout_count: 0,
            total_volume: 0,
            xp_earned: 0,
            created_at: now,
        }
    }

    /// Domain view used by winner selection
    pub fn standing(&self) -> ContestStanding {
        ContestStanding {
            guild_id: self.guild_id.clone(),
            workout_count: self.workout_count,
            total_volume: self.total_volume,
            xp_earned: self.xp_earned,
            created_at: self.created_at,
        }
    }
}
