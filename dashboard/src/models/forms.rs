use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::error::ActionResult;

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Runs the derived validators and turns failures into `MissingFields`.
pub fn validated<T: Validate>(form: T) -> ActionResult<T> {
    form.validate()?;
    Ok(form)
}

/// Create-model form. Catalog and hyperparameter checks happen in the
/// service, where they can fail with their own messages.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ModelSpecForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub model_name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub task_type: String,

    #[serde(default)]
    pub hyperparams: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateModelForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub model_id: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub model_name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub task_type: String,

    #[serde(default)]
    pub hyperparams: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TrainForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub model_id: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub data_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ModelIdForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub model_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DatasetIdForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub dataset_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsForm {
    #[serde(default)]
    pub model_name: String,

    #[serde(default)]
    pub task_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmDeleteForm {
    /// Present only when the checkbox is ticked.
    #[serde(default)]
    pub acknowledged: Option<String>,
}

impl ConfirmDeleteForm {
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BaseUrlForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(url, custom = "http_scheme")]
    pub base_url: String,
}

fn http_scheme(value: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ValidationError::new("http_scheme")),
    }
}
