//! Contest Entry Repository
//!
//! Read surface over the contest ledger. All writes go through
//! [`crate::services::ContestService`] so they stay atomic.

use rusqlite::{params, OptionalExtension};
use turf_core::{ContestStanding, GuildId, PeriodKey, TileId};

use crate::entities::{parse_ts, ContestEntryEntity};
use crate::error::StoreResult;
use crate::{lock_conn, SharedConnection};

type EntryRow = (String, String, u32, i32, i64, i64, i64, String);

pub struct ContestEntryRepository {
    conn: SharedConnection,
}

impl ContestEntryRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn get(
        &self,
        tile_id: &TileId,
        guild_id: &GuildId,
        period: PeriodKey,
    ) -> StoreResult<Option<ContestEntryEntity>> {
        let conn = lock_conn(&self.conn)?;
        let row: Option<EntryRow> = conn
            .query_row(
                "SELECT tile_id, guild_id, iso_week, iso_year,
                        workout_count, total_volume, xp_earned, created_at
                 FROM contest_entries
                 WHERE tile_id = ?1 AND guild_id = ?2 AND iso_week = ?3 AND iso_year = ?4",
                params![tile_id.as_str(), guild_id.as_str(), period.iso_week, period.iso_year],
                Self::read_row,
            )
            .optional()?;
        row.map(Self::into_entity).transpose()
    }

    /// All standings for a tile's contest in the given period. Ordered by
    /// volume for display; winner selection re-ranks with the full
    /// settlement comparator.
    pub fn standings(&self, tile_id: &TileId, period: PeriodKey) -> StoreResult<Vec<ContestStanding>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT tile_id, guild_id, iso_week, iso_year,
                    workout_count, total_volume, xp_earned, created_at
             FROM contest_entries
             WHERE tile_id = ?1 AND iso_week = ?2 AND iso_year = ?3
             ORDER BY total_volume DESC, guild_id ASC",
        )?;
        let rows = stmt.query_map(
            params![tile_id.as_str(), period.iso_week, period.iso_year],
            Self::read_row,
        )?;

        let mut standings = Vec::new();
        for row in rows {
            standings.push(Self::into_entity(row?)?.standing());
        }
        Ok(standings)
    }

    /// Number of ledger entries in a period (run reporting)
    pub fn count_for_period(&self, period: PeriodKey) -> StoreResult<i64> {
        let conn = lock_conn(&self.conn)?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM contest_entries WHERE iso_week = ?1 AND iso_year = ?2",
            params![period.iso_week, period.iso_year],
            |row| row.get(0),
        )?)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn into_entity(row: EntryRow) -> StoreResult<ContestEntryEntity> {
        let (tile_id, guild_id, iso_week, iso_year, workout_count, total_volume, xp_earned, created_at) = row;
        Ok(ContestEntryEntity {
            tile_id: TileId::new(tile_id),
            guild_id: GuildId::new(guild_id),
            period: PeriodKey::new(iso_year, iso_week),
            workout_count,
            total_volume,
            xp_earned,
            created_at: parse_ts(&created_at)?,
        })
    }
}
