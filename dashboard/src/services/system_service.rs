use std::sync::Arc;

use mlops_common::{HealthStatus, PoolStatus};

use crate::error::ActionResult;
use crate::services::backend::{ApiRequest, ApiTransport};

/// Backend health and worker-pool metrics.
#[derive(Clone)]
pub struct SystemService {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
}

impl SystemService {
    pub fn new(transport: Arc<dyn ApiTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub async fn get_health(&self) -> ActionResult<HealthStatus> {
        self.transport
            .send(&self.base_url, ApiRequest::get("/models/health"))
            .await?
            .json()
    }

    pub async fn get_pool_status(&self) -> ActionResult<PoolStatus> {
        self.transport
            .send(&self.base_url, ApiRequest::get("/models/pool_status"))
            .await?
            .json()
    }
}
