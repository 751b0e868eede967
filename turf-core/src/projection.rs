//! Map State Projection
//!
//! Read-only merge of tile ownership and the viewer's home zone into the
//! per-tile state the map renders. Home-zone membership always wins over
//! ownership.

use serde::{Deserialize, Serialize};

use crate::grid::{haversine_m, HOME_ZONE_RADIUS_M};
use crate::types::{AthleteId, Coordinate, GuildId, TileSnapshot};

/// Renderable per-tile state for a given viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileState {
    /// Inside the viewer's home-zone geofence (takes precedence)
    HomeZone,
    /// Controlled by the viewer's guild
    Owned,
    /// Controlled by a different guild
    Hostile,
    /// Not controlled by anyone
    Neutral,
}

impl TileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileState::HomeZone => "HOME_ZONE",
            TileState::Owned => "OWNED",
            TileState::Hostile => "HOSTILE",
            TileState::Neutral => "NEUTRAL",
        }
    }
}

/// The identity a map is projected for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    /// Viewing athlete
    pub athlete_id: AthleteId,
    /// The viewer's guild, if they belong to one
    pub guild_id: Option<GuildId>,
    /// Registered home coordinate, if any
    pub home: Option<Coordinate>,
}

/// Project one tile for a viewer
pub fn project_tile(viewer: &Viewer, tile: &TileSnapshot) -> TileState {
    if let Some(home) = viewer.home {
        if haversine_m(tile.centroid, home) <= HOME_ZONE_RADIUS_M {
            return TileState::HomeZone;
        }
    }

    match (&tile.controlling_guild_id, &viewer.guild_id) {
        (Some(owner), Some(mine)) if owner == mine => TileState::Owned,
        (Some(_), _) => TileState::Hostile,
        (None, _) => TileState::Neutral,
    }
}
