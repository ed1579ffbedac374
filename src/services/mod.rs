//! Business logic services

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod loans;
pub mod session;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub dashboard: dashboard::DashboardService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        sessions: Arc<dyn session::SessionStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), sessions.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone(), sessions),
            loans: loans::LoansService::new(repository, config.loans.clone()),
        }
    }
}
