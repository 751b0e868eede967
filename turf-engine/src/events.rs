//! Settlement Events
//!
//! Settlement used to reach into the achievement module directly, which
//! forced a runtime import to break the dependency cycle. Instead the
//! engine publishes events on a broadcast bus and interested collaborators
//! register listeners at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use turf_core::{GuildId, PeriodKey, TileId};

/// Events emitted by the settlement engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerritoryEvent {
    /// A tile's ownership was finalized for a concluded period
    TerritorySettled {
        tile_id: TileId,
        winning_guild_id: GuildId,
        period: PeriodKey,
        settled_at: DateTime<Utc>,
    },
}

/// Broadcast fan-out for settlement events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TerritoryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event; delivery is best-effort and lag-tolerant, and a
    /// bus with no subscribers simply drops the event
    pub fn publish(&self, event: TerritoryEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TerritoryEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A collaborator interested in settlement outcomes (achievement checks,
/// notification fan-out). Registered once at startup via
/// [`spawn_listener`].
#[async_trait]
pub trait SettlementListener: Send + Sync {
    async fn on_event(&self, event: TerritoryEvent);
}

/// Drive a listener from the bus until the bus is dropped
pub fn spawn_listener(
    bus: &EventBus,
    listener: Arc<dyn SettlementListener>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => listener.on_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "settlement listener lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
