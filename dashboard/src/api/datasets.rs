use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, warn};

use super::{content_type, csv_download, finish, preview_of, redirect_home};
use crate::{
    error::ActionResult,
    models::{ConfirmDeleteForm, DatasetIdForm, MultipartForm, UploadedFile},
    services::{tabular::preview_parquet, Table, TablePreview},
    session::{Notice, SessionHandle, Tab},
    AppState,
};

/// Local look at a CSV or parquet upload; other formats go through unseen.
fn local_preview(state: &AppState, file: Option<&UploadedFile>) -> Option<TablePreview> {
    let file = file?;
    let preview = if file.is_csv() {
        Table::parse(&file.bytes).map(|table| preview_of(state, &table))
    } else if file.is_parquet() {
        preview_parquet(&file.bytes, state.config.ui.preview_rows)
    } else {
        return None;
    };

    match preview {
        Ok(preview) => Some(preview),
        Err(e) => {
            warn!("Cannot preview {}: {}", file.file_name, e);
            None
        }
    }
}

#[post("/actions/datasets/upload")]
async fn upload_dataset(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Upload dataset";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::Datasets);

    let notice = match run_upload(&state, session, content_type(&req), body, false).await {
        Ok(notice) => notice,
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/datasets/update")]
async fn update_dataset(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Update dataset";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::Datasets);

    let notice = match run_upload(&state, session, content_type(&req), body, true).await {
        Ok(notice) => notice,
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

async fn run_upload(
    state: &AppState,
    session: SessionHandle,
    content_type: &str,
    body: web::Bytes,
    replace: bool,
) -> ActionResult<Notice> {
    let mut form = MultipartForm::parse(content_type, body).await?;
    let file = form.file.take();
    let preview = local_preview(state, file.as_ref());
    let service = state.dataset_service(session.id);

    let (action, dataset) = if replace {
        let dataset_id = form.field("dataset_id");
        remember_dataset_id(state, session, &dataset_id);
        ("Update dataset", service.update_dataset(&dataset_id, file).await?)
    } else {
        ("Upload dataset", service.upload_dataset(file).await?)
    };

    info!("Dataset {} stored as {}", dataset.dataset_name, dataset.dataset_id);
    remember_dataset_id(state, session, &dataset.dataset_id);

    let mut notice = Notice::success(
        action,
        format!("Dataset {} stored with id {}", dataset.dataset_name, dataset.dataset_id),
    )
    .with_payload(json!(dataset));
    if let Some(preview) = preview {
        notice = notice.with_preview(preview);
    }
    Ok(notice)
}

#[post("/actions/datasets/download")]
async fn download_dataset(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<DatasetIdForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Download dataset";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    let dataset_id = form.dataset_id.trim().to_string();
    state.sessions.update(session.id, |s| s.tab = Tab::Datasets);
    remember_dataset_id(&state, session, &dataset_id);

    let notice = match state.dataset_service(session.id).download_dataset(form).await {
        Ok(table) => match table.to_csv() {
            Ok(bytes) => {
                let (rows, columns) = table.shape();
                state.sessions.update(session.id, |s| {
                    s.download = Some(csv_download(format!("dataset_{}.csv", dataset_id), bytes))
                });
                Notice::success(
                    ACTION,
                    format!("Dataset {}: {} rows, {} columns", dataset_id, rows, columns),
                )
                .with_preview(preview_of(&state, &table))
                .with_download()
            }
            Err(e) => Notice::failure(ACTION, &crate::error::ActionError::malformed_response(e)),
        },
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/datasets/confirm_delete")]
async fn confirm_delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ConfirmDeleteForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let session = state.sessions.resolve(&req);
    let acknowledged = form.is_acknowledged();
    state.sessions.update(session.id, |s| {
        s.tab = Tab::Datasets;
        s.delete_acknowledged = acknowledged;
    });

    Ok(redirect_home(&state, session))
}

#[post("/actions/datasets/delete")]
async fn delete_dataset(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<DatasetIdForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Delete dataset";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    let dataset_id = form.dataset_id.trim().to_string();
    let acknowledged = state.sessions.update(session.id, |s| {
        s.tab = Tab::Datasets;
        s.delete_acknowledged
    });
    remember_dataset_id(&state, session, &dataset_id);

    let notice = match state
        .dataset_service(session.id)
        .delete_dataset(form, acknowledged)
        .await
    {
        Ok(reply) => {
            state.sessions.update(session.id, |s| s.delete_acknowledged = false);
            Notice::success(ACTION, format!("Dataset deleted: {}", dataset_id)).with_payload(reply)
        }
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

fn remember_dataset_id(state: &AppState, session: SessionHandle, dataset_id: &str) {
    state.sessions.update(session.id, |s| {
        s.fields.insert("dataset_id".to_string(), dataset_id.trim().to_string())
    });
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_dataset)
        .service(update_dataset)
        .service(download_dataset)
        .service(confirm_delete)
        .service(delete_dataset);
}
