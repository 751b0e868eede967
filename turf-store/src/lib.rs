//! Turf Store - Territory Persistence Layer
//!
//! SQLite-backed storage for the territory control engine. The database is
//! the coordination point for everything concurrent in the system: the
//! composite unique key on `contest_entries` arbitrates contest-open races,
//! conditional updates keep gold spending atomic, and the
//! `territory_history` primary key makes settlement idempotent. No
//! in-memory state outlives a request.
//!
//! # Usage
//!
//! ```ignore
//! use turf_store::TerritoryDatabase;
//!
//! let db = TerritoryDatabase::open("turf.db")?;
//! db.init_schema()?;
//! let contests = db.contest_service();
//! ```

pub mod entities;
pub mod error;
pub mod repos;
pub mod schema;
pub mod services;

pub use entities::{AthleteEntity, ContestEntryEntity, TerritoryHistoryEntity, TileEntity};
pub use error::{StoreError, StoreResult};
pub use repos::{AthleteRepository, ContestEntryRepository, TerritoryHistoryRepository, TileRepository};
pub use schema::TURF_SCHEMA;
pub use services::{ContestService, SettlementService};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

pub(crate) fn lock_conn(conn: &SharedConnection) -> StoreResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| StoreError::LockPoisoned)
}

/// Territory database facade
///
/// Owns the connection and exposes one repository per table plus the
/// transactional services that span tables.
pub struct TerritoryDatabase {
    conn: SharedConnection,
    /// Tile repository (map seed + reads)
    pub tiles: TileRepository,
    /// Athlete repository
    pub athletes: AthleteRepository,
    /// Contest entry repository (reads; writes go through services)
    pub entries: ContestEntryRepository,
    /// Territory history repository (reads; writes go through settlement)
    pub history: TerritoryHistoryRepository,
}

impl TerritoryDatabase {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (tests, ephemeral runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let conn: SharedConnection = Arc::new(Mutex::new(conn));
        Self {
            tiles: TileRepository::new(conn.clone()),
            athletes: AthleteRepository::new(conn.clone()),
            entries: ContestEntryRepository::new(conn.clone()),
            history: TerritoryHistoryRepository::new(conn.clone()),
            conn,
        }
    }

    /// Apply the schema; safe to call on every startup
    pub fn init_schema(&self) -> StoreResult<()> {
        lock_conn(&self.conn)?.execute_batch(TURF_SCHEMA)?;
        tracing::info!("territory database schema initialized");
        Ok(())
    }

    /// Transactional contest operations (open, contribute)
    pub fn contest_service(&self) -> ContestService {
        ContestService::new(self.conn.clone())
    }

    /// Settlement reads and per-tile settlement writes
    pub fn settlement_service(&self) -> SettlementService {
        SettlementService::new(self.conn.clone())
    }
}
