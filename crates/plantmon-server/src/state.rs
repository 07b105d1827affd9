use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use plantmon_alert::engine::AlertEngine;
use plantmon_storage::engine::SqliteStore;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub engine: Arc<Mutex<AlertEngine>>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
