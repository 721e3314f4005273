use std::sync::Arc;

use gamedeck_core::catalog::Catalog;

use crate::config::ServerConfig;
use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup, so no lock.
    pub catalog: Arc<Catalog>,
    pub suggest_limiter: Arc<IpRateLimiter>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_catalog(config, Catalog::seeded())
    }

    pub fn with_catalog(config: ServerConfig, catalog: Catalog) -> Self {
        let limiter = IpRateLimiter::new(
            config.limits.suggest_rate_limit_burst as f64,
            config.limits.suggest_rate_limit_per_sec,
        );
        Self {
            catalog: Arc::new(catalog),
            suggest_limiter: Arc::new(limiter),
            config: Arc::new(config),
        }
    }
}
