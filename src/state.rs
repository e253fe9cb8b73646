use std::sync::Arc;

use crate::config::AppConfig;
use crate::platform::DataPlatform;

/// Process-lifetime state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub platform: Arc<dyn DataPlatform>,
}

impl AppState {
    pub fn new(config: AppConfig, platform: Arc<dyn DataPlatform>) -> Self {
        Self {
            config: Arc::new(config),
            platform,
        }
    }
}
