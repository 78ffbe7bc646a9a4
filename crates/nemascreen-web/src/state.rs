//! Shared application state for the web server.

use std::sync::Arc;

use nemascreen_common::config::AppConfig;
use nemascreen_db::Database;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A manual score was recorded
    ScoreRecorded { experiment_id: String, score_code: i32, scorer: String },
    /// An experiment plate and its wells were created
    PlateCreated { plate_id: i64, worm_strain: String },
    /// A junk flag changed
    JunkToggled { experiment_id: String, is_junk: bool },
    /// An import run finished
    ImportFinished { kind: String, count: u64 },
    /// General system notification
    Notification { level: String, message: String },
}

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { db, config, event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Push an event to any connected clients. Fine if nobody listens.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }
}

pub type SharedState = Arc<AppState>;
