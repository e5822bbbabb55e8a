use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::finish;
use crate::{
    error::ActionError,
    models::BaseUrlForm,
    session::{Notice, Tab},
    AppState,
};

#[post("/actions/system/health")]
async fn get_health(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Check health";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::System);

    let notice = match state.system_service(session.id).get_health().await {
        Ok(health) => Notice::success(
            ACTION,
            format!(
                "Status: {}, workers: {}, queue size: {}",
                health.status, health.workers, health.queue_size
            ),
        )
        .with_payload(json!(health)),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/system/pool_status")]
async fn get_pool_status(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Pool status";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::System);

    let notice = match state.system_service(session.id).get_pool_status().await {
        Ok(pool) => Notice::success(
            ACTION,
            format!(
                "Max workers: {}, active: {}, queued: {}",
                pool.max_workers, pool.active, pool.queue
            ),
        )
        .with_payload(json!(pool)),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/system/base_url")]
async fn set_base_url(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<BaseUrlForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Set API base URL";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();

    let notice = match form.validate() {
        Ok(()) => {
            let base_url = form.base_url.trim_end_matches('/').to_string();
            info!("Session {} now targets {}", session.id, base_url);
            state.sessions.update(session.id, |s| {
                s.tab = Tab::System;
                s.base_url = base_url.clone();
            });
            Notice::success(ACTION, format!("API base URL set to {}", base_url))
        }
        Err(_) => {
            state.sessions.update(session.id, |s| s.tab = Tab::System);
            let error = ActionError::InvalidInput(format!("`{}` is not an http(s) URL", form.base_url));
            Notice::failure(ACTION, &error)
        }
    };

    Ok(finish(&state, session, notice))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_health)
        .service(get_pool_status)
        .service(set_base_url);
}
