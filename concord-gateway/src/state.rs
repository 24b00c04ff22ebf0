use std::time::{Duration, Instant};

use concord_db::ConcordDbPool;
use sqlx::SqlitePool;

/// Shared application state
///
/// Constructed once at startup and handed to every component that needs
/// data access; nothing else holds repository state.
pub struct AppState {
    db: ConcordDbPool,
    started_at: Instant,
}

impl AppState {
    pub fn new(db: ConcordDbPool) -> Self {
        Self {
            db,
            started_at: Instant::now(),
        }
    }

    /// Get the database pool for repository calls
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    /// Time since the process started
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
