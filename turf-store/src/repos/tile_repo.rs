//! Tile Repository
//!
//! Tiles are created once at map seed and never deleted. Ownership columns
//! are written exclusively by the settlement service.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use turf_core::{Coordinate, GuildId, TileId, TILE_RESOLUTION_DEG};

use crate::entities::{fmt_ts, parse_ts, TileEntity};
use crate::error::StoreResult;
use crate::{lock_conn, SharedConnection};

type TileRow = (String, f64, f64, String, Option<String>, Option<String>, String);

pub struct TileRepository {
    conn: SharedConnection,
}

impl TileRepository {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Insert a tile if it does not exist yet; returns whether it was created
    pub fn insert(&self, tile: &TileEntity) -> StoreResult<bool> {
        let conn = lock_conn(&self.conn)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO tiles
                (tile_id, center_lat, center_lng, region, controlling_guild_id, controlled_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tile.tile_id.as_str(),
                tile.center_lat,
                tile.center_lng,
                tile.region,
                tile.controlling_guild_id.as_ref().map(GuildId::as_str),
                tile.controlled_at.map(fmt_ts),
                fmt_ts(tile.created_at),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Seed every grid cell inside a bounding box; returns the number of
    /// tiles newly created (reseeding an area is a no-op)
    pub fn seed_bounds(
        &self,
        min: Coordinate,
        max: Coordinate,
        region: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let lat_lo = (min.lat / TILE_RESOLUTION_DEG).floor() as i32;
        let lat_hi = (max.lat / TILE_RESOLUTION_DEG).floor() as i32;
        let lng_lo = (min.lng / TILE_RESOLUTION_DEG).floor() as i32;
        let lng_hi = (max.lng / TILE_RESOLUTION_DEG).floor() as i32;

        let mut guard = lock_conn(&self.conn)?;
        let tx = guard.transaction()?;
        let mut created = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO tiles
                    (tile_id, center_lat, center_lng, region, controlling_guild_id, controlled_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5)",
            )?;
            for lat_idx in lat_lo..=lat_hi {
                for lng_idx in lng_lo..=lng_hi {
                    let center_lat = (lat_idx as f64 + 0.5) * TILE_RESOLUTION_DEG;
                    let center_lng = (lng_idx as f64 + 0.5) * TILE_RESOLUTION_DEG;
                    created += stmt.execute(params![
                        format!("{lat_idx}:{lng_idx}"),
                        center_lat,
                        center_lng,
                        region,
                        fmt_ts(now),
                    ])?;
                }
            }
        }
        tx.commit()?;
        tracing::info!(created, region, "seeded tile bounds");
        Ok(created)
    }

    pub fn get(&self, tile_id: &TileId) -> StoreResult<Option<TileEntity>> {
        let conn = lock_conn(&self.conn)?;
        let row: Option<TileRow> = conn
            .query_row(
                "SELECT tile_id, center_lat, center_lng, region,
                        controlling_guild_id, controlled_at, created_at
                 FROM tiles WHERE tile_id = ?1",
                params![tile_id.as_str()],
                Self::read_row,
            )
            .optional()?;
        row.map(Self::into_entity).transpose()
    }

    pub fn exists(&self, tile_id: &TileId) -> StoreResult<bool> {
        let conn = lock_conn(&self.conn)?;
        let hit: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM tiles WHERE tile_id = ?1",
                params![tile_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// Tiles whose centers fall inside a viewport bounding box
    pub fn in_bounds(&self, min: Coordinate, max: Coordinate) -> StoreResult<Vec<TileEntity>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT tile_id, center_lat, center_lng, region,
                    controlling_guild_id, controlled_at, created_at
             FROM tiles
             WHERE center_lat BETWEEN ?1 AND ?2
               AND center_lng BETWEEN ?3 AND ?4
             ORDER BY tile_id",
        )?;
        let rows = stmt.query_map(params![min.lat, max.lat, min.lng, max.lng], Self::read_row)?;

        let mut tiles = Vec::new();
        for row in rows {
            tiles.push(Self::into_entity(row?)?);
        }
        Ok(tiles)
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = lock_conn(&self.conn)?;
        Ok(conn.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TileRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn into_entity(row: TileRow) -> StoreResult<TileEntity> {
        let (tile_id, center_lat, center_lng, region, owner, controlled_at, created_at) = row;
        Ok(TileEntity {
            tile_id: TileId::new(tile_id),
            center_lat,
            center_lng,
            region,
            controlling_guild_id: owner.map(GuildId::new),
            controlled_at: controlled_at.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TerritoryDatabase;

    fn db() -> TerritoryDatabase {
        let db = TerritoryDatabase::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db
    }

    #[test]
    fn test_insert_is_create_once() {
        let db = db();
        let centroid = Coordinate::new(52.5225, 13.4075).unwrap();
        let tile = TileEntity::new(TileId::from_coord(centroid), centroid, "urban", Utc::now());

        assert!(db.tiles.insert(&tile).unwrap());
        assert!(!db.tiles.insert(&tile).unwrap());
        assert_eq!(db.tiles.count().unwrap(), 1);
    }

    #[test]
    fn test_seed_bounds_and_viewport() {
        let db = db();
        let min = Coordinate::new(52.500, 13.400).unwrap();
        let max = Coordinate::new(52.510, 13.410).unwrap();
        let created = db.tiles.seed_bounds(min, max, "urban", Utc::now()).unwrap();
        assert!(created >= 9, "expected a 3x3+ grid, got {created}");

        // Reseeding creates nothing new
        assert_eq!(db.tiles.seed_bounds(min, max, "urban", Utc::now()).unwrap(), 0);

        let visible = db.tiles.in_bounds(min, max).unwrap();
        assert_eq!(visible.len() as i64, db.tiles.count().unwrap());
        assert!(visible.iter().all(|t| t.controlling_guild_id.is_none()));
    }

    #[test]
    fn test_get_round_trips() {
        let db = db();
        let centroid = Coordinate::new(-33.8688, 151.2093).unwrap();
        let tile = TileEntity::new(TileId::from_coord(centroid), centroid, "harbor", Utc::now());
        db.tiles.insert(&tile).unwrap();

        let loaded = db.tiles.get(&tile.tile_id).unwrap().unwrap();
        assert_eq!(loaded.region, "harbor");
        assert_eq!(loaded.tile_id, tile.tile_id);
        assert!(db.tiles.get(&TileId::new("999999:999999")).unwrap().is_none());
    }
}
