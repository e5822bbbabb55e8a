//! Browser dashboard for an ML model-serving API.
//!
//! Pages are rendered on the server; every button maps to exactly one call
//! against the configured backend, and the outcome is kept in the caller's
//! session until the next action.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod ui;

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::services::{ApiTransport, DatasetService, HttpTransport, ModelService, SystemService};
use crate::session::SessionStore;

pub struct AppState {
    pub config: DashboardConfig,
    pub sessions: SessionStore,
    pub transport: Arc<dyn ApiTransport>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(&config.api.api_prefix));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: DashboardConfig, transport: Arc<dyn ApiTransport>) -> Self {
        let sessions = SessionStore::new(&config.api.base_url).with_limits(
            Duration::from_secs(config.ui.session_ttl_secs),
            config.ui.max_sessions,
        );
        Self {
            config,
            sessions,
            transport,
        }
    }

    pub fn model_service(&self, session: Uuid) -> ModelService {
        ModelService::new(self.transport.clone(), self.sessions.base_url(session))
    }

    pub fn dataset_service(&self, session: Uuid) -> DatasetService {
        DatasetService::new(self.transport.clone(), self.sessions.base_url(session))
    }

    pub fn system_service(&self, session: Uuid) -> SystemService {
        SystemService::new(self.transport.clone(), self.sessions.base_url(session))
    }
}
