use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::debug;

use super::{finish, redirect_home};
use crate::{
    session::{Notice, NoticeLevel, Tab},
    ui::{render_page, PageView},
    AppState,
};

#[get("/")]
async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    let session = state.sessions.resolve(&req);
    let snapshot = state.sessions.snapshot(session.id);

    let page = render_page(&PageView {
        config: &state.config,
        session: &snapshot,
    });

    Ok(HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(page))
}

#[get("/tab/{name}")]
async fn select_tab(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let tab = Tab::from_name(&path.into_inner())
        .ok_or_else(|| actix_web::error::ErrorNotFound("Unknown tab"))?;

    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = tab);
    Ok(redirect_home(&state, session))
}

/// Serves the file prepared by the last download or prediction action.
#[get("/download")]
async fn download(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    let session = state.sessions.resolve(&req);

    match state.sessions.snapshot(session.id).download {
        Some(file) => {
            debug!("Serving {} ({} bytes)", file.file_name, file.bytes.len());
            Ok(HttpResponse::Ok()
                .content_type(file.content_type)
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(file.file_name)],
                })
                .body(file.bytes))
        }
        None if session.is_new => Ok(redirect_home(&state, session)),
        None => {
            let notice = Notice {
                level: NoticeLevel::Warning,
                ..Notice::success("Download", "Nothing to download yet")
            };
            Ok(finish(&state, session, notice))
        }
    }
}

#[get("/healthz")]
async fn healthz(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "sessions": state.sessions.len(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(select_tab)
        .service(download)
        .service(healthz);
}
