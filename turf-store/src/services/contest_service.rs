//! Contest Service
//!
//! The two in-request write paths of the engine: opening a contest and
//! recording a workout contribution. Both are invoked concurrently by many
//! request handlers; correctness rests on the database, not on caller
//! discipline. Opening charges gold and inserts the zeroed ledger entry in
//! one transaction, with the composite unique key as the final arbiter of
//! races. Contributions are a single additive UPDATE so concurrent
//! increments never lose each other.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use turf_core::{AthleteId, GuildId, PeriodKey, TileId, WorkoutMetrics, CONTEST_COST};

use crate::entities::{fmt_ts, ContestEntryEntity};
use crate::error::{StoreError, StoreResult};
use crate::services::map_unique_violation;
use crate::{lock_conn, SharedConnection};

pub struct ContestService {
    conn: SharedConnection,
}

impl ContestService {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Open a contest: charge the athlete `CONTEST_COST` gold and create
    /// the guild's zeroed entry for this tile and period.
    ///
    /// Both writes commit together or not at all. Ownership of the tile is
    /// untouched; only settlement changes it.
    pub fn open_contest(
        &self,
        guild_id: &GuildId,
        tile_id: &TileId,
        athlete_id: &AthleteId,
        period: PeriodKey,
        now: DateTime<Utc>,
    ) -> StoreResult<ContestEntryEntity> {
        let mut guard = lock_conn(&self.conn)?;
        let tx = guard.transaction()?;

        let tile_exists = tx
            .query_row(
                "SELECT 1 FROM tiles WHERE tile_id = ?1",
                params![tile_id.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !tile_exists {
            return Err(StoreError::TileNotFound {
                tile_id: tile_id.as_str().to_string(),
            });
        }

        // Explicit duplicate check for a friendly error; the unique
        // constraint below still decides races.
        let already = tx
            .query_row(
                "SELECT 1 FROM contest_entries
                 WHERE tile_id = ?1 AND guild_id = ?2 AND iso_week = ?3 AND iso_year = ?4",
                params![tile_id.as_str(), guild_id.as_str(), period.iso_week, period.iso_year],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if already {
            return Err(self.already_contesting(tile_id, guild_id, period));
        }

        let gold: i64 = tx
            .query_row(
                "SELECT gold FROM athletes WHERE athlete_id = ?1",
                params![athlete_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => StoreError::AthleteNotFound {
                    athlete_id: athlete_id.as_str().to_string(),
                },
                other => StoreError::Sqlite(other),
            })?;
        if gold < CONTEST_COST {
            return Err(StoreError::InsufficientFunds {
                required: CONTEST_COST,
                available: gold,
            });
        }

        // Conditional decrement: a concurrent spend between the read above
        // and this write leaves the balance short, so re-check here.
        let charged = tx.execute(
            "UPDATE athletes SET gold = gold - ?1 WHERE athlete_id = ?2 AND gold >= ?1",
            params![CONTEST_COST, athlete_id.as_str()],
        )?;
        if charged == 0 {
            return Err(StoreError::InsufficientFunds {
                required: CONTEST_COST,
                available: gold,
            });
        }

        let entry = ContestEntryEntity::new(tile_id.clone(), guild_id.clone(), period, now);
        tx.execute(
            "INSERT INTO contest_entries
                (tile_id, guild_id, iso_week, iso_year, workout_count, total_volume, xp_earned, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5)",
            params![
                tile_id.as_str(),
                guild_id.as_str(),
                period.iso_week,
                period.iso_year,
                fmt_ts(entry.created_at),
            ],
        )
        .map_err(|err| map_unique_violation(err, self.already_contesting(tile_id, guild_id, period)))?;

        tx.commit()?;
        tracing::info!(
            guild = guild_id.as_str(),
            tile = tile_id.as_str(),
            period = %period,
            "contest opened"
        );
        Ok(entry)
    }

    /// Fold one workout's metrics into the guild's entry for this period.
    ///
    /// A single additive UPDATE keyed on `(tile, guild, period)`; when no
    /// entry exists the contribution is dropped by design and `false` is
    /// returned. Sums are commutative, so concurrent calls need no
    /// ordering.
    pub fn record_contribution(
        &self,
        guild_id: &GuildId,
        tile_id: &TileId,
        metrics: WorkoutMetrics,
        period: PeriodKey,
    ) -> StoreResult<bool> {
        let guard = lock_conn(&self.conn)?;
        let affected = guard.execute(
            "UPDATE contest_entries
             SET workout_count = workout_count + 1,
                 total_volume = total_volume + ?1,
                 xp_earned = xp_earned + ?2
             WHERE tile_id = ?3 AND guild_id = ?4 AND iso_week = ?5 AND iso_year = ?6",
            params![
                metrics.volume,
                metrics.xp,
                tile_id.as_str(),
                guild_id.as_str(),
                period.iso_week,
                period.iso_year,
            ],
        )?;

        if affected == 0 {
            tracing::debug!(
                guild = guild_id.as_str(),
                tile = tile_id.as_str(),
                period = %period,
                "contribution dropped: no open contest entry"
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn already_contesting(&self, tile_id: &TileId, guild_id: &GuildId, period: PeriodKey) -> StoreError {
        StoreError::AlreadyContesting {
            tile_id: tile_id.as_str().to_string(),
            guild_id: guild_id.as_str().to_string(),
            period: period.label(),
        }
    }
}
