//! Server-side rendering of the dashboard page.

mod assets;
pub mod html;

use std::fmt::Write;

use mlops_common::{ModelFamily, TaskType};

use crate::config::DashboardConfig;
use crate::session::{Notice, NoticeLevel, SessionState, Tab};
use html::{escape, field_id, file_input, select, text_input};

pub struct PageView<'a> {
    pub config: &'a DashboardConfig,
    pub session: &'a SessionState,
}

pub fn render_page(view: &PageView) -> String {
    let session = view.session;
    let title = escape(&view.config.ui.title);

    let mut nav = String::new();
    for tab in Tab::ALL {
        let class = if tab == session.tab { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            r#"<a href="/tab/{}"{}>{}</a>"#,
            tab.as_str(),
            class,
            tab.label()
        );
    }

    let notice = session.notice.as_ref().map(render_notice).unwrap_or_default();

    let body = match session.tab {
        Tab::Models => models_tab(view),
        Tab::Training => training_tab(session),
        Tab::Predict => predict_tab(view),
        Tab::Datasets => datasets_tab(view),
        Tab::System => system_tab(session),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="app">
<header><h1>{title}</h1><span class="api">API: {api}</span></header>
<nav>{nav}</nav>
{notice}
{body}
</div>
<div id="busy">Working…</div>
<script>{script}</script>
</body>
</html>"#,
        title = title,
        style = assets::STYLE,
        api = escape(&session.base_url),
        nav = nav,
        notice = notice,
        body = body,
        script = assets::SCRIPT,
    )
}

fn render_notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Success => "success",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };

    let mut out = format!(
        r#"<div class="notice {}"><div class="meta">{} · {}</div><div class="message">{}</div>"#,
        class,
        escape(&notice.action),
        notice.at.format("%H:%M:%S UTC"),
        escape(&notice.message),
    );

    if let Some(payload) = &notice.payload {
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        let _ = write!(out, "<pre>{}</pre>", escape(&pretty));
    }
    if let Some(preview) = &notice.preview {
        out.push_str(&html::table(preview));
    }
    if notice.download_ready {
        out.push_str(r#"<a class="download" href="/download">Download CSV</a>"#);
    }

    out.push_str("</div>");
    out
}

fn card(title: &str, hint: &str, form: &str) -> String {
    let hint = if hint.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="hint">{}</p>"#, escape(hint))
    };
    format!(
        r#"<section class="card"><h2>{}</h2>{}{}</section>"#,
        escape(title),
        hint,
        form
    )
}

fn family_select(form: &str, session: &SessionState) -> String {
    select(
        form,
        "model_name",
        "Model",
        ModelFamily::ALL.iter().map(|family| family.as_str()),
        session.field("model_name"),
    )
}

fn task_select(form: &str, session: &SessionState) -> String {
    select(
        form,
        "task_type",
        "Task type",
        TaskType::ALL.iter().map(|task| task.as_str()),
        session.field("task_type"),
    )
}

fn hyperparams_input(form: &str, session: &SessionState) -> String {
    format!(
        r#"<label for="{id}">Hyperparameters (JSON)</label><textarea id="{id}" name="hyperparams" placeholder="{{}}">{value}</textarea>"#,
        id = field_id(form, "hyperparams"),
        value = escape(session.field("hyperparams"))
    )
}

fn models_tab(view: &PageView) -> String {
    let session = view.session;

    let create = format!(
        r#"<form method="post" action="/actions/models/create">{}{}{}<button type="submit">Create model</button> <button type="submit" formaction="/actions/models/defaults">Load defaults</button></form>"#,
        family_select("create", session),
        task_select("create", session),
        hyperparams_input("create", session),
    );

    let update = format!(
        r#"<form method="post" action="/actions/models/update">{}{}{}{}<button type="submit">Update model</button></form>"#,
        text_input("update", "model_id", "Model ID", session.field("model_id")),
        family_select("update", session),
        task_select("update", session),
        hyperparams_input("update", session),
    );

    let info = format!(
        r#"<form method="post" action="/actions/models/info">{}<button type="submit">Get model info</button></form>"#,
        text_input("info", "model_id", "Model ID", session.field("model_id")),
    );

    let delete = format!(
        r#"<form method="post" action="/actions/models/delete">{}<button type="submit" class="danger">Delete model</button></form>"#,
        text_input("delete-model", "model_id", "Model ID", session.field("model_id")),
    );

    let families = r#"<form method="post" action="/actions/models/type_list"><button type="submit">List model families</button></form>"#;

    [
        card("Create model", "Empty hyperparameters mean the backend defaults.", &create),
        card("Update model", "", &update),
        card("Model info", "", &info),
        card("Delete model", "", &delete),
        card("Model families", "Families registered on the backend.", families),
    ]
    .into_iter()
    .fold(String::from(r#"<div class="grid">"#), |mut out, section| {
        out.push_str(&section);
        out
    }) + "</div>"
}

fn training_tab(session: &SessionState) -> String {
    let train = format!(
        r#"<form method="post" action="/actions/models/train">{}{}<button type="submit">Train model</button></form>"#,
        text_input("train", "model_id", "Model ID", session.field("model_id")),
        text_input("train", "data_id", "Dataset ID", session.field("data_id")),
    );

    format!(
        r#"<div class="grid">{}</div>"#,
        card(
            "Train model",
            "Training runs on the backend worker pool; this waits for the result.",
            &train
        )
    )
}

fn predict_tab(view: &PageView) -> String {
    let session = view.session;
    let accept = view.config.accept_attribute();

    let predict = format!(
        r#"<form method="post" action="/actions/models/predict" enctype="multipart/form-data">{}{}<button type="submit">Get predictions</button></form>"#,
        text_input("predict", "model_id", "Model ID", session.field("model_id")),
        file_input("predict", "Data to score", &accept),
    );

    format!(
        r#"<div class="grid">{}</div>"#,
        card("Predict", "Results are offered as a CSV download.", &predict)
    )
}

fn datasets_tab(view: &PageView) -> String {
    let session = view.session;
    let accept = view.config.accept_attribute();
    let dataset_id = session.field("dataset_id");

    let upload = format!(
        r#"<form method="post" action="/actions/datasets/upload" enctype="multipart/form-data">{}<button type="submit">Upload dataset</button></form>"#,
        file_input("upload", "Dataset file", &accept),
    );

    let update = format!(
        r#"<form method="post" action="/actions/datasets/update" enctype="multipart/form-data">{}{}<button type="submit">Update dataset</button></form>"#,
        text_input("update-dataset", "dataset_id", "Dataset ID", dataset_id),
        file_input("update-dataset", "Replacement file", &accept),
    );

    let download = format!(
        r#"<form method="post" action="/actions/datasets/download">{}<button type="submit">Download dataset</button></form>"#,
        text_input("download", "dataset_id", "Dataset ID", dataset_id),
    );

    let checked = if session.delete_acknowledged { " checked" } else { "" };
    let disabled = if session.delete_acknowledged { "" } else { " disabled" };
    let delete = format!(
        r#"<form method="post" action="/actions/datasets/confirm_delete"><label class="checkbox"><input type="checkbox" name="acknowledged" value="yes"{checked} onchange="this.form.submit()"> I understand this permanently deletes the dataset</label></form>
<form method="post" action="/actions/datasets/delete">{input}<button type="submit" class="danger"{disabled}>Delete dataset</button></form>"#,
        checked = checked,
        input = text_input("delete-dataset", "dataset_id", "Dataset ID", dataset_id),
        disabled = disabled,
    );

    let hint = format!(
        "Accepted: {}. The dataset must contain exactly one column named `target` with no missing values.",
        view.config.uploads.accepted_extensions.join(", ")
    );

    [
        card("Upload dataset", &hint, &upload),
        card("Update dataset", "", &update),
        card("Download dataset", "", &download),
        card("Delete dataset", "", &delete),
    ]
    .into_iter()
    .fold(String::from(r#"<div class="grid">"#), |mut out, section| {
        out.push_str(&section);
        out
    }) + "</div>"
}

fn system_tab(session: &SessionState) -> String {
    let health = r#"<form method="post" action="/actions/system/health"><button type="submit">Check health</button></form>"#;
    let pool = r#"<form method="post" action="/actions/system/pool_status"><button type="submit">Pool status</button></form>"#;
    let base_url = format!(
        r#"<form method="post" action="/actions/system/base_url"><label for="backend-base_url">API base URL</label><input type="url" id="backend-base_url" name="base_url" value="{}"><button type="submit">Save</button></form>"#,
        escape(&session.base_url),
    );

    [
        card("Health", "Backend status, worker count and queue size.", health),
        card("Worker pool", "", pool),
        card("Backend", "", &base_url),
    ]
    .into_iter()
    .fold(String::from(r#"<div class="grid">"#), |mut out, section| {
        out.push_str(&section);
        out
    }) + "</div>"
}
