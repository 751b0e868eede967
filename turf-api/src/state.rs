//! Application State

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use turf_engine::{EventBus, SettlementEngine};
use turf_store::TerritoryDatabase;

use crate::auth::AuthConfig;

/// Service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Listen address
    pub listen_addr: String,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "turf-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            enable_cors: true,
        }
    }
}

/// State shared across handlers
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Authentication configuration for the scheduler trigger
    pub auth_config: AuthConfig,
    /// Territory database
    pub database: Arc<TerritoryDatabase>,
    /// Settlement engine
    pub engine: Arc<SettlementEngine>,
    /// Settlement event bus (listeners register at startup)
    pub events: EventBus,
    /// Service start time
    pub started_at: DateTime<Utc>,
    /// Request counter
    request_counter: RwLock<u64>,
}

impl AppState {
    /// Create state over an opened database; the settlement engine shares
    /// the database and publishes on the given bus
    pub fn new(database: Arc<TerritoryDatabase>, events: EventBus) -> Self {
        let engine = Arc::new(SettlementEngine::new(database.clone(), events.clone()));
        Self {
            config: ApiConfig::default(),
            auth_config: AuthConfig::default(),
            database,
            engine,
            events,
            started_at: Utc::now(),
            request_counter: RwLock::new(0),
        }
    }

    /// Override the service configuration
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the authentication configuration
    pub fn with_auth(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    /// Service uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }

    pub async fn increment_requests(&self) -> u64 {
        let mut counter = self.request_counter.write().await;
        *counter += 1;
        *counter
    }

    pub async fn request_count(&self) -> u64 {
        *self.request_counter.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let db = TerritoryDatabase::open_in_memory().unwrap();
        db.init_schema().unwrap();
        AppState::new(Arc::new(db), EventBus::default())
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.service_name, "turf-api");
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert!(config.enable_cors);
    }

    #[tokio::test]
    async fn test_request_counter() {
        let state = test_state();
        assert_eq!(state.request_count().await, 0);
        assert_eq!(state.increment_requests().await, 1);
        assert_eq!(state.increment_requests().await, 2);
        assert_eq!(state.request_count().await, 2);
    }

    #[test]
    fn test_uptime_starts_near_zero() {
        let state = test_state();
        assert!(state.uptime_secs() < 2);
    }
}
