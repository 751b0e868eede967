//! Database Schema
//!
//! SQLite DDL for the territory tables. The composite unique key on
//! `contest_entries` is the concurrency guard for contest opening: racing
//! openers both pass the explicit existence check, but only one insert
//! survives the constraint. `territory_history`'s primary key is the
//! settlement idempotence guard in the same way.

/// Full schema, applied idempotently on startup
pub const TURF_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tiles (
    tile_id TEXT PRIMARY KEY,
    center_lat REAL NOT NULL,
    center_lng REAL NOT NULL,
    region TEXT NOT NULL,
    controlling_guild_id TEXT,
    controlled_at TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contest_entries (
    tile_id TEXT NOT NULL,
    guild_id TEXT NOT NULL,
    iso_week INTEGER NOT NULL,
    iso_year INTEGER NOT NULL,
    workout_count INTEGER NOT NULL DEFAULT 0,
    total_volume INTEGER NOT NULL DEFAULT 0,
    xp_earned INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE (tile_id, guild_id, iso_week, iso_year)
);

CREATE TABLE IF NOT EXISTS territory_history (
    tile_id TEXT NOT NULL,
    winning_guild_id TEXT NOT NULL,
    iso_week INTEGER NOT NULL,
    iso_year INTEGER NOT NULL,
    settled_at TEXT NOT NULL,
    PRIMARY KEY (tile_id, iso_week, iso_year)
);

CREATE TABLE IF NOT EXISTS athletes (
    athlete_id TEXT PRIMARY KEY,
    guild_id TEXT,
    home_lat REAL,
    home_lng REAL,
    gold INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_period ON contest_entries(iso_year, iso_week);
CREATE INDEX IF NOT EXISTS idx_entries_tile_period ON contest_entries(tile_id, iso_year, iso_week);
CREATE INDEX IF NOT EXISTS idx_history_period ON territory_history(iso_year, iso_week);
CREATE INDEX IF NOT EXISTS idx_tiles_center ON tiles(center_lat, center_lng);
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_all_tables() {
        assert!(TURF_SCHEMA.contains("CREATE TABLE IF NOT EXISTS tiles"));
        assert!(TURF_SCHEMA.contains("CREATE TABLE IF NOT EXISTS contest_entries"));
        assert!(TURF_SCHEMA.contains("CREATE TABLE IF NOT EXISTS territory_history"));
        assert!(TURF_SCHEMA.contains("CREATE TABLE IF NOT EXISTS athletes"));
    }

    #[test]
    fn test_contest_key_is_composite_unique() {
        assert!(TURF_SCHEMA.contains("UNIQUE (tile_id, guild_id, iso_week, iso_year)"));
        assert!(TURF_SCHEMA.contains("PRIMARY KEY (tile_id, iso_week, iso_year)"));
    }
}
