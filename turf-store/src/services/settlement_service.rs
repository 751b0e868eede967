//! Settlement Service
//!
//! Storage half of the weekly settlement batch: candidate discovery and the
//! per-tile settle transaction. `tiles.controlling_guild_id` is written
//! nowhere else in the system.

use chrono::{DateTime, Utc};
use rusqlite::params;
use turf_core::{ContestStanding, GuildId, PeriodKey, TileId};

use crate::entities::fmt_ts;
use crate::error::{StoreError, StoreResult};
use crate::repos::ContestEntryRepository;
use crate::{lock_conn, SharedConnection};

pub struct SettlementService {
    conn: SharedConnection,
}

impl SettlementService {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Tiles with at least one entry in the period and no settlement record
    /// yet. Ordered by tile id so interrupted runs resume in a stable
    /// sequence.
    pub fn unsettled_tiles(&self, period: PeriodKey) -> StoreResult<Vec<TileId>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT e.tile_id
             FROM contest_entries e
             WHERE e.iso_week = ?1 AND e.iso_year = ?2
               AND NOT EXISTS (
                   SELECT 1 FROM territory_history h
                   WHERE h.tile_id = e.tile_id AND h.iso_week = ?1 AND h.iso_year = ?2
               )
             ORDER BY e.tile_id",
        )?;
        let rows = stmt.query_map(params![period.iso_week, period.iso_year], |row| {
            row.get::<_, String>(0)
        })?;

        let mut tiles = Vec::new();
        for row in rows {
            tiles.push(TileId::new(row?));
        }
        Ok(tiles)
    }

    /// Standings for one tile's concluded contest
    pub fn standings(&self, tile_id: &TileId, period: PeriodKey) -> StoreResult<Vec<ContestStanding>> {
        ContestEntryRepository::new(self.conn.clone()).standings(tile_id, period)
    }

    /// Atomically record a settlement: append the history row and update
    /// tile ownership in one transaction.
    ///
    /// The history primary key is the idempotence guard: if another run
    /// already settled this (tile, period), the insert is ignored, the
    /// ownership update is skipped, and `false` comes back.
    pub fn settle_tile(
        &self,
        tile_id: &TileId,
        winner: &GuildId,
        period: PeriodKey,
        settled_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut guard = lock_conn(&self.conn)?;
        let tx = guard.transaction()?;

        let appended = tx.execute(
            "INSERT OR IGNORE INTO territory_history
                (tile_id, winning_guild_id, iso_week, iso_year, settled_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tile_id.as_str(),
                winner.as_str(),
                period.iso_week,
                period.iso_year,
                fmt_ts(settled_at),
            ],
        )?;
        if appended == 0 {
            return Ok(false);
        }

        let updated = tx.execute(
            "UPDATE tiles SET controlling_guild_id = ?1, controlled_at = ?2 WHERE tile_id = ?3",
            params![winner.as_str(), fmt_ts(settled_at), tile_id.as_str()],
        )?;
        if updated == 0 {
            // Ledger entries exist for a tile the map never seeded; refuse
            // to settle into nowhere.
            return Err(StoreError::TileNotFound {
                tile_id: tile_id.as_str().to_string(),
            });
        }

        tx.commit()?;
        Ok(true)
    }
}
