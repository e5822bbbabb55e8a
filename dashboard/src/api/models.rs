use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::info;

use super::{content_type, csv_download, finish, preview_of};
use crate::{
    error::{ActionError, ActionResult},
    models::{DefaultsForm, ModelIdForm, ModelSpecForm, MultipartForm, TrainForm, UpdateModelForm},
    services::{ModelService, Table},
    session::{Notice, SessionHandle, Tab},
    AppState,
};

#[post("/actions/models/type_list")]
async fn list_model_types(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "List model families";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::Models);

    let notice = match state.model_service(session.id).list_model_types().await {
        Ok(families) => Notice::success(ACTION, format!("{} model families available", families.len()))
            .with_payload(json!(families)),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/create")]
async fn create_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ModelSpecForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Create model";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    remember_spec(&state, session, &form.model_name, &form.task_type, &form.hyperparams);

    let notice = match state.model_service(session.id).create_model(form).await {
        Ok(saved) => {
            info!("Model {} created", saved.model_id);
            remember_model_id(&state, session, &saved.model_id);
            Notice::success(ACTION, format!("Model created: {}", saved.model_id))
                .with_payload(json!(saved))
        }
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/defaults")]
async fn load_defaults(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<DefaultsForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Load defaults";
    let session = state.sessions.resolve(&req);

    let notice = match ModelService::default_hyperparams(&form) {
        Ok(defaults) => {
            let text = serde_json::to_string_pretty(&defaults).unwrap_or_else(|_| defaults.to_string());
            remember_spec(&state, session, &form.model_name, &form.task_type, &text);
            Notice::success(
                ACTION,
                format!("Defaults for {} / {}", form.model_name.trim(), form.task_type.trim()),
            )
            .with_payload(defaults)
        }
        Err(e) => {
            state.sessions.update(session.id, |s| {
                s.remember(
                    Tab::Models,
                    &[("model_name", form.model_name.as_str()), ("task_type", form.task_type.as_str())],
                )
            });
            Notice::failure(ACTION, &e)
        }
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/update")]
async fn update_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<UpdateModelForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Update model";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    remember_spec(&state, session, &form.model_name, &form.task_type, &form.hyperparams);
    remember_model_id(&state, session, &form.model_id);

    let notice = match state.model_service(session.id).update_model(form).await {
        Ok(saved) => Notice::success(ACTION, format!("Model updated: {}", saved.model_id))
            .with_payload(json!(saved)),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/info")]
async fn get_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ModelIdForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Get model info";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    remember_model_id(&state, session, &form.model_id);

    let notice = match state.model_service(session.id).get_model(form).await {
        Ok(model) => Notice::success(
            ACTION,
            format!("{}: {}", model.model_name, model.learning_status),
        )
        .with_payload(json!(model)),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/delete")]
async fn delete_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ModelIdForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Delete model";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    let model_id = form.model_id.trim().to_string();
    remember_model_id(&state, session, &form.model_id);

    let notice = match state.model_service(session.id).delete_model(form).await {
        Ok(reply) => Notice::success(ACTION, format!("Model deleted: {}", model_id)).with_payload(reply),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/train")]
async fn train_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<TrainForm>,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Train model";
    let session = state.sessions.resolve(&req);
    let form = form.into_inner();
    state.sessions.update(session.id, |s| {
        s.remember(
            Tab::Training,
            &[("model_id", form.model_id.as_str()), ("data_id", form.data_id.as_str())],
        )
    });
    let model_id = form.model_id.trim().to_string();

    let notice = match state.model_service(session.id).train_model(form).await {
        Ok(reply) => Notice::success(ACTION, format!("Training finished for model {}", model_id))
            .with_payload(reply),
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

#[post("/actions/models/predict")]
async fn predict(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    const ACTION: &str = "Get predictions";
    let session = state.sessions.resolve(&req);
    state.sessions.update(session.id, |s| s.tab = Tab::Predict);

    let notice = match run_prediction(&state, session, content_type(&req), body).await {
        Ok((model_id, table)) => {
            let (rows, _) = table.shape();
            let preview = preview_of(&state, &table);
            match table.to_csv() {
                Ok(bytes) => {
                    state.sessions.update(session.id, |s| {
                        s.download = Some(csv_download(format!("predictions_{}.csv", model_id), bytes))
                    });
                    Notice::success(ACTION, format!("{} predictions from model {}", rows, model_id))
                        .with_preview(preview)
                        .with_download()
                }
                Err(e) => Notice::failure(ACTION, &ActionError::malformed_response(e)),
            }
        }
        Err(e) => Notice::failure(ACTION, &e),
    };

    Ok(finish(&state, session, notice))
}

async fn run_prediction(
    state: &AppState,
    session: SessionHandle,
    content_type: &str,
    body: web::Bytes,
) -> ActionResult<(String, Table)> {
    let mut form = MultipartForm::parse(content_type, body).await?;
    let model_id = form.field("model_id");
    remember_model_id(state, session, &model_id);

    let table = state
        .model_service(session.id)
        .predict(&model_id, form.file.take())
        .await?;
    Ok((model_id, table))
}

fn remember_spec(
    state: &AppState,
    session: SessionHandle,
    model_name: &str,
    task_type: &str,
    hyperparams: &str,
) {
    state.sessions.update(session.id, |s| {
        s.remember(
            Tab::Models,
            &[("model_name", model_name), ("task_type", task_type), ("hyperparams", hyperparams)],
        )
    });
}

fn remember_model_id(state: &AppState, session: SessionHandle, model_id: &str) {
    state
        .sessions
        .update(session.id, |s| {
            s.fields.insert("model_id".to_string(), model_id.trim().to_string())
        });
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_model_types)
        .service(create_model)
        .service(load_defaults)
        .service(update_model)
        .service(get_model)
        .service(delete_model)
        .service(train_model)
        .service(predict);
}
