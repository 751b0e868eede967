//! Turf API - HTTP Surface
//!
//! Axum service exposing the territory control engine:
//! - Contest ingress (`POST /api/v1/contests`, `POST /api/v1/contributions`)
//! - Map projection (`GET /api/v1/map`, `GET /api/v1/tiles/{id}/standings`)
//! - The scheduler-only settlement trigger
//!   (`POST /api/v1/jobs/settlement`, bearer shared secret)
//! - Health and stats
//!
//! Business-rule failures map to specific status codes so clients can
//! branch UI behavior: 409 for an already-open contest, 422 for missing
//! gold, 404 for unknown tiles or athletes.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AuthConfig;
pub use error::{ApiError, ApiResult};
pub use routes::{build_app, create_router, create_v1_router};
pub use state::{ApiConfig, AppState};
