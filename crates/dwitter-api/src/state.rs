use std::sync::Arc;

use dwitter_dispatch::Services;
use dwitter_persist::PersistenceClient;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Services,
}

impl AppState {
    pub fn new(config: Config, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            services,
        }
    }

    pub fn store(&self) -> &Arc<dyn PersistenceClient> {
        self.services.store()
    }
}
