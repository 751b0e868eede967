//! Contest Scoring
//!
//! Winner selection for a concluded tile contest, plus the influence score
//! shown on the map. The two deliberately use different inputs: settlement
//! ranks guilds by accumulated training volume alone, while influence
//! (volume + xp) is a display-only ranking for standings views. Ties on
//! volume break deterministically toward the guild that opened its contest
//! first, then the lexicographically smallest guild id, so the outcome
//! never depends on row order.

use std::cmp::Ordering;

use crate::types::ContestStanding;

/// Gold charged to open a contest on a tile
pub const CONTEST_COST: i64 = 50;

/// Settlement ordering: best standing first
pub fn settlement_cmp(a: &ContestStanding, b: &ContestStanding) -> Ordering {
    b.total_volume
        .cmp(&a.total_volume)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.guild_id.cmp(&b.guild_id))
}

/// Pick the winning standing of a concluded contest, if any guild competed
pub fn select_winner(standings: &[ContestStanding]) -> Option<&ContestStanding> {
    standings.iter().min_by(|a, b| settlement_cmp(a, b))
}

/// Display-only influence score for standings views
pub fn influence_score(standing: &ContestStanding) -> i64 {
    standing.total_volume + standing.xp_earned
}
