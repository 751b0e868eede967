//! Athlete Repository

use rusqlite::{params, OptionalExtension};
use turf_core::{AthleteId, GuildId};

use crate::entities::{fmt_ts, parse_ts, AthleteEntity};
use crate::error::{StoreError, StoreResult};
use crate::{lock_conn, SharedConnection};

type AthleteRow = (String, Option<String>, Option<f64>, Option<f64>, i64, String);

pub struct AthleteRepository {
    conn: SharedConnection,
}

impl AthleteRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Create or refresh an athlete record. Guild membership, home
    /// coordinate and gold grants are fed by external collaborators, so the
    /// whole row is replaceable except the registration timestamp.
    pub fn upsert(&self, athlete: &AthleteEntity) -> StoreResult<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO athletes (athlete_id, guild_id, home_lat, home_lng, gold, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(athlete_id) DO UPDATE SET
                guild_id = excluded.guild_id,
                home_lat = excluded.home_lat,
                home_lng = excluded.home_lng,
                gold = excluded.gold",
            params![
                athlete.athlete_id.as_str(),
                athlete.guild_id.as_ref().map(GuildId::as_str),
                athlete.home_lat,
                athlete.home_lng,
                athlete.gold,
                fmt_ts(athlete.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, athlete_id: &AthleteId) -> StoreResult<Option<AthleteEntity>> {
        let conn = lock_conn(&self.conn)?;
        let row: Option<AthleteRow> = conn
            .query_row(
                "SELECT athlete_id, guild_id, home_lat, home_lng, gold, created_at
                 FROM athletes WHERE athlete_id = ?1",
                params![athlete_id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, guild, home_lat, home_lng, gold, created_at)| {
            Ok(AthleteEntity {
                athlete_id: AthleteId::new(id),
                guild_id: guild.map(GuildId::new),
                home_lat,
                home_lng,
                gold,
                created_at: parse_ts(&created_at)?,
            })
        })
        .transpose()
    }

    /// Fetch an athlete or fail with a typed not-found error
    pub fn require(&self, athlete_id: &AthleteId) -> StoreResult<AthleteEntity> {
        self.get(athlete_id)?.ok_or_else(|| StoreError::AthleteNotFound {
            athlete_id: athlete_id.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TerritoryDatabase;
    use chrono::Utc;
    use turf_core::Coordinate;

    #[test]
    fn test_upsert_and_require() {
        let db = TerritoryDatabase::open_in_memory().unwrap();
        db.init_schema().unwrap();

        let id = AthleteId::new("athlete:1");
        let athlete = AthleteEntity::new(id.clone(), Utc::now())
            .with_guild(GuildId::new("guild:a"))
            .with_home(Coordinate::new(52.52, 13.405).unwrap())
            .with_gold(75);
        db.athletes.upsert(&athlete).unwrap();

        let loaded = db.athletes.require(&id).unwrap();
        assert_eq!(loaded.gold, 75);
        assert_eq!(loaded.guild_id, Some(GuildId::new("guild:a")));

        // Collaborator update: guild change + gold grant
        let updated = loaded.with_guild(GuildId::new("guild:b")).with_gold(200);
        db.athletes.upsert(&updated).unwrap();
        assert_eq!(db.athletes.require(&id).unwrap().gold, 200);

        assert!(matches!(
            db.athletes.require(&AthleteId::new("athlete:ghost")),
            Err(StoreError::AthleteNotFound { .. })
        ));
    }
}
