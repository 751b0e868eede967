//! API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use turf_core::{
    influence_score, project_tile, AthleteId, Coordinate, GuildId, PeriodKey, TileId, Viewer,
    WorkoutMetrics,
};
use turf_engine::SettlementReport;
use turf_store::{ContestEntryEntity, StoreResult, TileEntity};

use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::internal(format!("blocking task failed: {err}"))
}

fn entry_dto(entry: ContestEntryEntity) -> ContestEntryDto {
    ContestEntryDto {
        tile_id: entry.tile_id.as_str().to_string(),
        guild_id: entry.guild_id.as_str().to_string(),
        period: entry.period.into(),
        workout_count: entry.workout_count,
        total_volume: entry.total_volume,
        xp_earned: entry.xp_earned,
        created_at: entry.created_at,
    }
}

/// Health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let db = state.database.clone();
    let db_ok = tokio::task::spawn_blocking(move || db.tiles.count())
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);

    Ok(Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" }.to_string(),
        version: state.config.version.clone(),
        uptime_secs: state.uptime_secs(),
    }))
}

/// Service statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let requests = state.request_count().await;
    let db = state.database.clone();
    let (tiles, settlements, entries_this_period) =
        tokio::task::spawn_blocking(move || -> StoreResult<(i64, i64, i64)> {
            Ok((
                db.tiles.count()?,
                db.history.count()?,
                db.entries.count_for_period(PeriodKey::current(Utc::now()))?,
            ))
        })
        .await
        .map_err(join_error)??;

    Ok(Json(StatsResponse {
        tiles,
        settlements,
        entries_this_period,
        requests,
    }))
}

/// Open a contest on a tile for the acting athlete's guild
pub async fn open_contest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenContestRequest>,
) -> ApiResult<Json<ContestEntryDto>> {
    state.increment_requests().await;

    let tile_id = TileId::new(&req.tile_id);
    tile_id.cell_indices()?;
    let guild_id = GuildId::new(&req.guild_id);
    let athlete_id = AthleteId::new(&req.athlete_id);
    let period = req
        .period
        .map(PeriodKey::from)
        .unwrap_or_else(|| PeriodKey::current(Utc::now()));

    let contests = state.database.contest_service();
    let entry = tokio::task::spawn_blocking(move || {
        contests.open_contest(&guild_id, &tile_id, &athlete_id, period, Utc::now())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(entry_dto(entry)))
}

/// Fold a processed workout into the current period's ledger entry
pub async fn record_contribution(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContributionRequest>,
) -> ApiResult<Json<ContributionResponse>> {
    state.increment_requests().await;

    let metrics = WorkoutMetrics::new(req.volume, req.xp)?;
    let tile_id = TileId::new(&req.tile_id);
    tile_id.cell_indices()?;
    let guild_id = GuildId::new(&req.guild_id);
    let period = PeriodKey::current(Utc::now());

    let contests = state.database.contest_service();
    let applied = tokio::task::spawn_blocking(move || {
        contests.record_contribution(&guild_id, &tile_id, metrics, period)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(ContributionResponse { applied }))
}

/// Project a viewport of tiles for a viewer
pub async fn map_state(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> ApiResult<Json<MapResponse>> {
    state.increment_requests().await;

    let min = Coordinate::new(query.min_lat, query.min_lng)?;
    let max = Coordinate::new(query.max_lat, query.max_lng)?;
    if min.lat > max.lat || min.lng > max.lng {
        return Err(ApiError::validation(
            "viewport min corner must be south-west of max corner",
        ));
    }
    let athlete_id = AthleteId::new(&query.athlete_id);

    let db = state.database.clone();
    let (viewer, tiles) = tokio::task::spawn_blocking(move || -> StoreResult<(Viewer, Vec<TileEntity>)> {
        let athlete = db.athletes.require(&athlete_id)?;
        let tiles = db.tiles.in_bounds(min, max)?;
        Ok((athlete.viewer(), tiles))
    })
    .await
    .map_err(join_error)??;

    let tiles = tiles
        .into_iter()
        .map(|tile| {
            let snapshot = tile.snapshot();
            let tile_state = project_tile(&viewer, &snapshot);
            MapTileDto {
                tile_id: snapshot.tile_id.as_str().to_string(),
                lat: snapshot.centroid.lat,
                lng: snapshot.centroid.lng,
                region: snapshot.region,
                state: tile_state.as_str().to_string(),
                controlling_guild_id: snapshot.controlling_guild_id.map(|g| g.as_str().to_string()),
                controlled_at: snapshot.controlled_at,
            }
        })
        .collect();

    Ok(Json(MapResponse { tiles }))
}

/// Current standings of a tile contest, ranked for display
pub async fn tile_standings(
    State(state): State<Arc<AppState>>,
    Path(tile_id): Path<String>,
    Query(query): Query<StandingsQuery>,
) -> ApiResult<Json<StandingsResponse>> {
    state.increment_requests().await;

    let tile_id = TileId::new(&tile_id);
    tile_id.cell_indices()?;
    let period = match (query.iso_year, query.iso_week) {
        (Some(year), Some(week)) => PeriodKey::new(year, week),
        _ => PeriodKey::current(Utc::now()),
    };

    let db = state.database.clone();
    let lookup_id = tile_id.clone();
    let standings = tokio::task::spawn_blocking(move || {
        if !db.tiles.exists(&lookup_id)? {
            return Err(turf_store::StoreError::TileNotFound {
                tile_id: lookup_id.as_str().to_string(),
            });
        }
        db.entries.standings(&lookup_id, period)
    })
    .await
    .map_err(join_error)??;

    let standings = standings
        .iter()
        .map(|s| StandingDto {
            guild_id: s.guild_id.as_str().to_string(),
            workout_count: s.workout_count,
            total_volume: s.total_volume,
            xp_earned: s.xp_earned,
            influence: influence_score(s),
        })
        .collect();

    Ok(Json(StandingsResponse {
        tile_id: tile_id.as_str().to_string(),
        period: period.into(),
        standings,
    }))
}

/// Scheduler-triggered settlement run. Partial per-tile failure is still a
/// successful run; the report carries the details.
pub async fn trigger_settlement(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SettlementTriggerRequest>>,
) -> ApiResult<Json<SettlementReport>> {
    state.increment_requests().await;

    let period = body.and_then(|Json(req)| req.period).map(PeriodKey::from);
    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        match period {
            Some(period) => engine.run(period, now),
            None => engine.run_concluded(now),
        }
    })
    .await
    .map_err(join_error)??;

    Ok(Json(report))
}
