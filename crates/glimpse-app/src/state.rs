use std::sync::Arc;

use tokio::sync::RwLock;

use glimpse_config::Config;

/// Shared application state
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }
}
