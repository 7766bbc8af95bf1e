use crate::config::Config;
use crate::store::EventStore;

/// Shared application state
pub struct AppState {
    /// Where recorded events are written and read back from
    pub store: EventStore,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        tracing::info!("Storing recorded events under {}", config.data_dir.display());
        Self {
            store: EventStore::new(config.data_dir.clone()),
        }
    }
}
