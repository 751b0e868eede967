//! API DTOs
//!
//! Request/response bodies for the HTTP surface. Kept separate from the
//! domain types so the wire format can evolve independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turf_core::PeriodKey;

/// Contest period on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodDto {
    pub iso_year: i32,
    pub iso_week: u32,
}

impl From<PeriodKey> for PeriodDto {
    fn from(period: PeriodKey) -> Self {
        Self {
            iso_year: period.iso_year,
            iso_week: period.iso_week,
        }
    }
}

impl From<PeriodDto> for PeriodKey {
    fn from(dto: PeriodDto) -> Self {
        PeriodKey::new(dto.iso_year, dto.iso_week)
    }
}

/// Open-contest request
#[derive(Debug, Deserialize)]
pub struct OpenContestRequest {
    /// Acting athlete (pays the contest cost)
    pub athlete_id: String,
    /// Guild opening the contest
    pub guild_id: String,
    /// Target tile
    pub tile_id: String,
    /// Defaults to the current period
    pub period: Option<PeriodDto>,
}

/// Created contest entry
#[derive(Debug, Serialize, Deserialize)]
pub struct ContestEntryDto {
    pub tile_id: String,
    pub guild_id: String,
    pub period: PeriodDto,
    pub workout_count: i64,
    pub total_volume: i64,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

/// Workout-processed ingress: the collaborator has already geofenced the
/// workout to a tile and resolved the athlete's guild
#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    pub guild_id: String,
    pub tile_id: String,
    pub volume: i64,
    pub xp: i64,
}

/// Whether the contribution applied to an open entry
#[derive(Debug, Serialize, Deserialize)]
pub struct ContributionResponse {
    pub applied: bool,
}

/// Map viewport query
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    /// Viewer athlete id
    pub athlete_id: String,
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

/// One projected tile of the viewport
#[derive(Debug, Serialize, Deserialize)]
pub struct MapTileDto {
    pub tile_id: String,
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    /// HOME_ZONE | OWNED | HOSTILE | NEUTRAL for this viewer
    pub state: String,
    pub controlling_guild_id: Option<String>,
    pub controlled_at: Option<DateTime<Utc>>,
}

/// Viewport projection response
#[derive(Debug, Serialize, Deserialize)]
pub struct MapResponse {
    pub tiles: Vec<MapTileDto>,
}

/// Tile standings query
#[derive(Debug, Deserialize)]
pub struct StandingsQuery {
    /// Defaults to the current period
    pub iso_year: Option<i32>,
    pub iso_week: Option<u32>,
}

/// One guild's standing in a tile contest
#[derive(Debug, Serialize, Deserialize)]
pub struct StandingDto {
    pub guild_id: String,
    pub workout_count: i64,
    pub total_volume: i64,
    pub xp_earned: i64,
    /// Display score: volume + xp
    pub influence: i64,
}

/// Tile standings response
#[derive(Debug, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub tile_id: String,
    pub period: PeriodDto,
    pub standings: Vec<StandingDto>,
}

/// Settlement trigger request (scheduler)
#[derive(Debug, Default, Deserialize)]
pub struct SettlementTriggerRequest {
    /// Defaults to the most recently concluded period
    pub period: Option<PeriodDto>,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Service statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Seeded tiles
    pub tiles: i64,
    /// Settlement records written so far
    pub settlements: i64,
    /// Ledger entries in the current period
    pub entries_this_period: i64,
    /// Requests served since startup
    pub requests: u64,
}
