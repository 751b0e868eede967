//! Turf Core - Territory Control Domain
//!
//! Pure domain logic for the territory control engine:
//! - **Tile grid**: deterministic coordinate -> tile geocoding and the
//!   home-zone geofence predicate
//! - **Periods**: ISO-week contest windows with correct year-boundary
//!   handling
//! - **Scoring**: winner selection for a concluded contest and the
//!   display-only influence score
//! - **Projection**: per-viewer map state (home zone / owned / hostile /
//!   neutral)
//!
//! Everything in this crate is side-effect free. Persistence lives in
//! `turf-store`, batch settlement in `turf-engine`.

pub mod error;
pub mod grid;
pub mod period;
pub mod projection;
pub mod scoring;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use grid::{haversine_m, is_within_home_zone, TileId, HOME_ZONE_RADIUS_M, TILE_RESOLUTION_DEG};
pub use period::PeriodKey;
pub use projection::{project_tile, TileState, Viewer};
pub use scoring::{influence_score, select_winner, settlement_cmp, CONTEST_COST};
pub use types::{AthleteId, ContestStanding, Coordinate, GuildId, TileSnapshot, WorkoutMetrics};
