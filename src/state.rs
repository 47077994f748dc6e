use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::services::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, notifier: Notifier) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
        }
    }
}
