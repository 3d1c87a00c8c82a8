//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::FleetStore;
use crate::services::{AvailabilityResolver, ResourceCatalog, RouteRegistry, SearchFilterPaginator};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub catalog: ResourceCatalog,
    pub routes: RouteRegistry,
    pub availability: AvailabilityResolver,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, store: Arc<dyn FleetStore>) -> Self {
        let paginator = SearchFilterPaginator::new(config.default_page_size, config.max_page_size);
        Self {
            jwt: JwtConfig::from(&config),
            catalog: ResourceCatalog::new(store.clone(), paginator),
            routes: RouteRegistry::new(store.clone(), paginator),
            availability: AvailabilityResolver::new(store),
            config: Arc::new(config),
        }
    }
}
