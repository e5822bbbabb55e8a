mod datasets;
mod models;
mod pages;
mod system;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::services::TablePreview;
use crate::session::{Notice, PendingDownload, SessionHandle};
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(pages::configure)
        .configure(models::configure)
        .configure(datasets::configure)
        .configure(system::configure);
}

/// Post/redirect/get: every action lands back on the page. The cookie is
/// only handed out once the session has been stored.
fn redirect_home(state: &AppState, handle: SessionHandle) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, "/"));
    if handle.is_new && state.sessions.contains(handle.id) {
        response.cookie(handle.cookie());
    }
    response.finish()
}

fn finish(state: &AppState, handle: SessionHandle, notice: Notice) -> HttpResponse {
    state
        .sessions
        .update(handle.id, |session| session.notice = Some(notice));
    redirect_home(state, handle)
}

fn content_type(req: &HttpRequest) -> &str {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn csv_download(file_name: String, bytes: Vec<u8>) -> PendingDownload {
    PendingDownload {
        file_name,
        content_type: mime::TEXT_CSV_UTF_8.to_string(),
        bytes,
    }
}

fn preview_of(state: &AppState, table: &crate::services::Table) -> TablePreview {
    table.preview(state.config.ui.preview_rows)
}
