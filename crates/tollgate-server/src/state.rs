use std::sync::Arc;
use std::time::Duration;

use tollgate_billing::Reconciler;
use tollgate_catalog::ModelCatalog;
use tollgate_config::Config;
use tollgate_relay::{InFlightRegistry, StreamRelay};
use tollgate_store::GatewayStore;

/// Shared handles every handler needs
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ModelCatalog>,
    pub store: Arc<dyn GatewayStore>,
    pub registry: InFlightRegistry,
    pub relay: StreamRelay,
    pub reconciler: Reconciler,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn GatewayStore>) -> Result<Self, reqwest::Error> {
        let catalog = Arc::new(ModelCatalog::from_config(&config));
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let relay = StreamRelay::new(
            client,
            Duration::from_secs(config.limits.idle_timeout_secs),
        );
        let reconciler = Reconciler::new(store.clone());

        Ok(Self {
            config: Arc::new(config),
            catalog,
            store,
            registry: InFlightRegistry::new(),
            relay,
            reconciler,
        })
    }
}
