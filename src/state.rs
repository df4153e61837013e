use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::relay::RelayClient;
use crate::services::RelayService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub relay: Arc<dyn RelayClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, relay: Arc<dyn RelayClient>, config: AppConfig) -> Self {
        Self {
            db,
            relay,
            config: Arc::new(config),
        }
    }

    pub fn relay_service(&self) -> RelayService {
        RelayService::new(self.db.clone(), self.relay.clone())
    }
}
