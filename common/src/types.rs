//! JSON shapes returned by the model-serving API.
//!
//! Fields the dashboard does not interpret are kept in `extra` so they can
//! still be shown to the operator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Ids are opaque to the dashboard; some deployments return them as numbers.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTypeList {
    pub message: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    #[serde(deserialize_with = "opaque_id")]
    pub model_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub learning_status: String,
    #[serde(default)]
    pub hyperparams: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub workers: u64,
    pub queue_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub max_workers: u64,
    pub active: u64,
    pub queue: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRef {
    #[serde(deserialize_with = "opaque_id")]
    pub dataset_id: String,
    pub dataset_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_model_keeps_extra_fields() {
        let created: SavedModel =
            serde_json::from_value(json!({"model_id": "abc123", "status": "saved"})).unwrap();
        assert_eq!(created.model_id, "abc123");
        assert_eq!(created.extra.get("status"), Some(&json!("saved")));
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let dataset: DatasetRef =
            serde_json::from_value(json!({"dataset_id": 17, "dataset_name": "iris.csv"})).unwrap();
        assert_eq!(dataset.dataset_id, "17");
        assert!(dataset.extra.is_empty());
    }

    #[test]
    fn test_model_info_without_hyperparams() {
        let info: ModelInfo = serde_json::from_value(json!({
            "model_name": "svm",
            "learning_status": "untrained",
        }))
        .unwrap();
        assert_eq!(info.hyperparams, Value::Null);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result = serde_json::from_value::<HealthStatus>(json!({"status": "ok", "workers": 4}));
        assert!(result.is_err());
    }
}
