use crate::config::GatewayConfig;
use matching_engine::{ConnectionRegistry, Matcher, MemoryQueueStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub matcher: Matcher<MemoryQueueStore>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.registry_config()));
        let store = Arc::new(MemoryQueueStore::new());
        let matcher = Matcher::new(registry.clone(), store, config.buckets.clone());

        Self {
            registry,
            matcher,
            config: Arc::new(config),
        }
    }
}
