use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use mlops_common::{Hyperparameters, ModelInfo, ModelSpec, ModelTypeList, SavedModel};

use crate::error::{ActionError, ActionResult};
use crate::models::{
    validated, DefaultsForm, ModelIdForm, ModelSpecForm, TrainForm, UpdateModelForm, UploadedFile,
};
use crate::services::backend::{ApiRequest, ApiResponse, ApiTransport};
use crate::services::tabular::Table;

#[derive(Clone)]
pub struct ModelService {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
}

impl ModelService {
    pub fn new(transport: Arc<dyn ApiTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    async fn call(&self, request: ApiRequest) -> ActionResult<ApiResponse> {
        info!("Calling {} on {}", request.path, self.base_url);
        self.transport.send(&self.base_url, request).await
    }

    pub async fn list_model_types(&self) -> ActionResult<Vec<String>> {
        let list: ModelTypeList = self
            .call(ApiRequest::get("/models/type_list"))
            .await?
            .json()?;

        Ok(list.message)
    }

    pub async fn create_model(&self, form: ModelSpecForm) -> ActionResult<SavedModel> {
        // Hyperparameters first: broken JSON is reported as such whatever
        // else is wrong with the form.
        let hyperparams: Hyperparameters = form.hyperparams.parse()?;
        let form = validated(form)?;
        let spec = ModelSpec::parse(&form.model_name, &form.task_type)?;

        let hyperparams = hyperparams.to_json_string();
        self.call(ApiRequest::form(
            "/models/create_and_save_model",
            &[
                ("model_name", spec.family.as_str()),
                ("task_type", spec.task.as_str()),
                ("hyperparams", hyperparams.as_str()),
            ],
        ))
        .await?
        .json()
    }

    pub async fn update_model(&self, form: UpdateModelForm) -> ActionResult<SavedModel> {
        let hyperparams: Hyperparameters = form.hyperparams.parse()?;
        let form = validated(form)?;
        let spec = ModelSpec::parse(&form.model_name, &form.task_type)?;

        let hyperparams = hyperparams.to_json_string();
        self.call(ApiRequest::form(
            "/models/update_model",
            &[
                ("model_id", form.model_id.as_str()),
                ("model_name", spec.family.as_str()),
                ("task_type", spec.task.as_str()),
                ("hyperparams", hyperparams.as_str()),
            ],
        ))
        .await?
        .json()
    }

    pub async fn train_model(&self, form: TrainForm) -> ActionResult<Value> {
        let form = validated(form)?;

        self.call(ApiRequest::form(
            "/models/learn_model",
            &[("model_id", form.model_id.as_str()), ("data_id", form.data_id.as_str())],
        ))
        .await?
        .json()
    }

    /// Sends `file` for scoring and parses the tabular reply.
    pub async fn predict(&self, model_id: &str, file: Option<UploadedFile>) -> ActionResult<Table> {
        let form = validated(ModelIdForm {
            model_id: model_id.trim().to_string(),
        })?;
        let file = file.ok_or(ActionError::MissingFile)?;

        let body = self
            .call(ApiRequest::multipart(
                "/models/get_predictions_from_file",
                &[("model_id", form.model_id.as_str())],
                file,
            ))
            .await?
            .into_success()?;

        Table::parse(&body).map_err(ActionError::malformed_response)
    }

    pub async fn get_model(&self, form: ModelIdForm) -> ActionResult<ModelInfo> {
        let form = validated(form)?;

        self.call(ApiRequest::form(
            "/models/get_model",
            &[("model_id", form.model_id.as_str())],
        ))
        .await?
        .json()
    }

    pub async fn delete_model(&self, form: ModelIdForm) -> ActionResult<Value> {
        let form = validated(form)?;

        self.call(ApiRequest::form(
            "/models/delete_model",
            &[("model_id", form.model_id.as_str())],
        ))
        .await?
        .json()
    }

    /// Local catalog lookup; never touches the network.
    pub fn default_hyperparams(form: &DefaultsForm) -> ActionResult<Value> {
        Ok(mlops_common::default_hyperparams(&form.model_name, &form.task_type)?)
    }
}
