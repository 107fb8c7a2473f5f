//! Shared state for the gateway server.

use std::sync::Arc;
use std::time::Instant;
use steerco_core::AppConfig;
use steerco_tenancy::TenantRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<TenantRegistry>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, registry: TenantRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            start_time: Instant::now(),
        }
    }
}
