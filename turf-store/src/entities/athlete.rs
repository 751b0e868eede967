//! Athlete Entity
//!
//! Account fields the engine needs: gold (spent by the contest opener),
//! the registered home coordinate (home-zone projection), and a snapshot
//! of guild membership maintained by the external membership collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turf_core::{AthleteId, Coordinate, GuildId, Viewer};

/// Athlete (user) record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AthleteEntity {
    /// Athlete identifier
    pub athlete_id: AthleteId,
    /// Current guild membership, if any
    pub guild_id: Option<GuildId>,
    /// Registered home latitude
    pub home_lat: Option<f64>,
    /// Registered home longitude
    pub home_lng: Option<f64>,
    /// Spendable gold balance
    pub gold: i64,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl AthleteEntity {
    pub fn new(athlete_id: AthleteId, now: DateTime<Utc>) -> Self {
        Self {
            athlete_id,
            guild_id: None,
            home_lat: None,
            home_lng: None,
            gold: 0,
            created_at: now,
        }
    }

    pub fn with_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn with_home(mut self, home: Coordinate) -> Self {
        self.home_lat = Some(home.lat);
        self.home_lng = Some(home.lng);
        self
    }

    pub fn with_gold(mut self, gold: i64) -> Self {
        self.gold = gold;
        self
    }

    /// Registered home coordinate, if both components are set
    pub fn home(&self) -> Option<Coordinate> {
        match (self.home_lat, self.home_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }

    /// Projection identity for the map
    pub fn viewer(&self) -> Viewer {
        Viewer {
            athlete_id: self.athlete_id.clone(),
            guild_id: self.guild_id.clone(),
            home: self.home(),
        }
    }
}
