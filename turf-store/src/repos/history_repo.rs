//! Territory History Repository
//!
//! Read surface over the append-only settlement log. Rows are written only
//! by [`crate::services::SettlementService::settle_tile`].

use rusqlite::{params, OptionalExtension};
use turf_core::{GuildId, PeriodKey, TileId};

use crate::entities::{parse_ts, TerritoryHistoryEntity};
use crate::error::StoreResult;
use crate::{lock_conn, SharedConnection};

type HistoryRow = (String, String, u32, i32, String);

pub struct TerritoryHistoryRepository {
    conn: SharedConnection,
}

impl TerritoryHistoryRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn get(&self, tile_id: &TileId, period: PeriodKey) -> StoreResult<Option<TerritoryHistoryEntity>> {
        let conn = lock_conn(&self.conn)?;
        let row: Option<HistoryRow> = conn
            .query_row(
                "SELECT tile_id, winning_guild_id, iso_week, iso_year, settled_at
                 FROM territory_history
                 WHERE tile_id = ?1 AND iso_week = ?2 AND iso_year = ?3",
                params![tile_id.as_str(), period.iso_week, period.iso_year],
                Self::read_row,
            )
            .optional()?;
        row.map(Self::into_entity).transpose()
    }

    /// Most recent settlements for a tile, newest first
    pub fn for_tile(&self, tile_id: &TileId, limit: usize) -> StoreResult<Vec<TerritoryHistoryEntity>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT tile_id, winning_guild_id, iso_week, iso_year, settled_at
             FROM territory_history
             WHERE tile_id = ?1
             ORDER BY iso_year DESC, iso_week DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![tile_id.as_str(), limit as i64], Self::read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::into_entity(row?)?);
        }
        Ok(records)
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = lock_conn(&self.conn)?;
        Ok(conn.query_row("SELECT COUNT(*) FROM territory_history", [], |row| row.get(0))?)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn into_entity(row: HistoryRow) -> StoreResult<TerritoryHistoryEntity> {
        let (tile_id, winning_guild_id, iso_week, iso_year, settled_at) = row;
        Ok(TerritoryHistoryEntity {
            tile_id: TileId::new(tile_id),
            winning_guild_id: GuildId::new(winning_guild_id),
            period: PeriodKey::new(iso_year, iso_week),
            settled_at: parse_ts(&settled_at)?,
        })
    }
}
