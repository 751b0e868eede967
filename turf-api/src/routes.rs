//! API Routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::scheduler_auth_middleware;
use crate::handlers::*;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;

    // Scheduler-only routes sit behind the bearer check; player routes are
    // authenticated upstream by the session layer
    let jobs = Router::new()
        .route("/jobs/settlement", post(trigger_settlement))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            scheduler_auth_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/contests", post(open_contest))
        .route("/contributions", post(record_contribution))
        .route("/map", get(map_state))
        .route("/tiles/:tile_id/standings", get(tile_standings))
        .merge(jobs)
        .with_state(state);

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

/// Create a router for the V1 API with /api/v1 prefix
pub fn create_v1_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api/v1", create_router(state))
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);

    let root_router = Router::new().route("/", get(|| async { "Turf Territory API" }));

    let health_router = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    root_router
        .merge(health_router)
        .merge(create_v1_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use turf_core::{AthleteId, Coordinate, GuildId, TileId};
    use turf_engine::EventBus;
    use turf_store::{AthleteEntity, TerritoryDatabase, TileEntity};
    use tower::util::ServiceExt;

    const TILE_CENTER: (f64, f64) = (52.5225, 13.4075);

    fn seeded_state() -> (AppState, TileId) {
        let db = TerritoryDatabase::open_in_memory().unwrap();
        db.init_schema().unwrap();

        let centroid = Coordinate::new(TILE_CENTER.0, TILE_CENTER.1).unwrap();
        let tile_id = TileId::from_coord(centroid);
        db.tiles
            .insert(&TileEntity::new(tile_id.clone(), centroid, "urban", Utc::now()))
            .unwrap();

        db.athletes
            .upsert(
                &AthleteEntity::new(AthleteId::new("athlete:1"), Utc::now())
                    .with_guild(GuildId::new("guild:a"))
                    .with_home(centroid)
                    .with_gold(500),
            )
            .unwrap();
        db.athletes
            .upsert(
                &AthleteEntity::new(AthleteId::new("athlete:poor"), Utc::now())
                    .with_guild(GuildId::new("guild:b"))
                    .with_gold(5),
            )
            .unwrap();

        (AppState::new(Arc::new(db), EventBus::default()), tile_id)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health_endpoints() {
        let (state, _) = seeded_state();
        let app = build_app(state);

        for uri in ["/", "/healthz", "/api/v1/health", "/api/v1/stats"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_open_contest_then_conflict() {
        let (state, tile_id) = seeded_state();
        let app = build_app(state);
        let body = json!({
            "athlete_id": "athlete:1",
            "guild_id": "guild:a",
            "tile_id": tile_id.as_str(),
        });

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/contests", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let entry = body_json(response).await;
        assert_eq!(entry["workout_count"], 0);
        assert_eq!(entry["guild_id"], "guild:a");

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/contests", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "ALREADY_CONTESTING");
    }

    #[tokio::test]
    async fn test_open_contest_insufficient_funds() {
        let (state, tile_id) = seeded_state();
        let app = build_app(state);

        let response = app
            .oneshot(post_json(
                "/api/v1/contests",
                json!({
                    "athlete_id": "athlete:poor",
                    "guild_id": "guild:b",
                    "tile_id": tile_id.as_str(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "INSUFFICIENT_FUNDS");
    }

    #[tokio::test]
    async fn test_open_contest_unknown_tile_is_404() {
        let (state, _) = seeded_state();
        let app = build_app(state);

        let response = app
            .oneshot(post_json(
                "/api/v1/contests",
                json!({
                    "athlete_id": "athlete:1",
                    "guild_id": "guild:a",
                    "tile_id": "9999:9999",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "TILE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_contribution_applies_only_with_open_entry() {
        let (state, tile_id) = seeded_state();
        let app = build_app(state);

        // No entry yet: dropped
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/contributions",
                json!({
                    "guild_id": "guild:a",
                    "tile_id": tile_id.as_str(),
                    "volume": 300,
                    "xp": 20,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["applied"], false);

        // Open, then contribute
        app.clone()
            .oneshot(post_json(
                "/api/v1/contests",
                json!({
                    "athlete_id": "athlete:1",
                    "guild_id": "guild:a",
                    "tile_id": tile_id.as_str(),
                }),
            ))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/contributions",
                json!({
                    "guild_id": "guild:a",
                    "tile_id": tile_id.as_str(),
                    "volume": 300,
                    "xp": 20,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["applied"], true);

        // Negative metrics never reach the ledger
        let response = app
            .oneshot(post_json(
                "/api/v1/contributions",
                json!({
                    "guild_id": "guild:a",
                    "tile_id": tile_id.as_str(),
                    "volume": -5,
                    "xp": 0,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_map_projection_home_zone_precedence() {
        let (state, tile_id) = seeded_state();
        let app = build_app(state);

        let uri = "/api/v1/map?athlete_id=athlete:1&min_lat=52.51&min_lng=13.40&max_lat=52.53&max_lng=13.42";
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let tiles = body["tiles"].as_array().unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0]["tile_id"], tile_id.as_str());
        // The athlete's home sits on this tile, so it projects HOME_ZONE
        // even though nobody owns it
        assert_eq!(tiles[0]["state"], "HOME_ZONE");
    }

    #[tokio::test]
    async fn test_map_for_unknown_athlete_is_404() {
        let (state, _) = seeded_state();
        let app = build_app(state);

        let uri = "/api/v1/map?athlete_id=athlete:ghost&min_lat=52.51&min_lng=13.40&max_lat=52.53&max_lng=13.42";
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settlement_trigger_runs_and_reports() {
        let (state, tile_id) = seeded_state();
        let app = build_app(state);

        app.clone()
            .oneshot(post_json(
                "/api/v1/contests",
                json!({
                    "athlete_id": "athlete:1",
                    "guild_id": "guild:a",
                    "tile_id": tile_id.as_str(),
                    "period": {"iso_year": 2025, "iso_week": 42},
                }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/jobs/settlement",
                json!({"period": {"iso_year": 2025, "iso_week": 42}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["settled"], 1);
        assert_eq!(report["failed"], 0);

        // Standings survive after settlement; the ledger is immutable
        let uri = format!(
            "/api/v1/tiles/{}/standings?iso_year=2025&iso_week=42",
            tile_id.as_str()
        );
        let response = app
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let standings = body_json(response).await;
        assert_eq!(standings["standings"].as_array().unwrap().len(), 1);
        assert_eq!(standings["standings"][0]["influence"], 0);
    }

    #[tokio::test]
    async fn test_settlement_trigger_requires_token_when_auth_enabled() {
        let (state, _) = seeded_state();
        let state = state.with_auth(AuthConfig {
            enabled: true,
            scheduler_token: Some("cron-secret".to_string()),
        });
        let app = build_app(state);

        // Missing token
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/jobs/settlement", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Wrong token
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs/settlement")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Correct token
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs/settlement")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer cron-secret")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Player routes stay open
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
