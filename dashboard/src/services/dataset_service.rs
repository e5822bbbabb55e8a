use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use mlops_common::DatasetRef;

use crate::error::{ActionError, ActionResult};
use crate::models::{validated, DatasetIdForm, UploadedFile};
use crate::services::backend::{ApiRequest, ApiResponse, ApiTransport};
use crate::services::tabular::Table;

#[derive(Clone)]
pub struct DatasetService {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
}

impl DatasetService {
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

    pub async fn upload_dataset(&self, file: Option<UploadedFile>) -> ActionResult<DatasetRef> {
        let file = file.ok_or(ActionError::MissingFile)?;

        self.call(ApiRequest::multipart("/data/upload_dataset", &[], file))
            .await?
            .json()
    }

    pub async fn update_dataset(
        &self,
        dataset_id: &str,
        file: Option<UploadedFile>,
    ) -> ActionResult<DatasetRef> {
        let form = validated(DatasetIdForm {
            dataset_id: dataset_id.trim().to_string(),
        })?;
        let file = file.ok_or(ActionError::MissingFile)?;

        self.call(ApiRequest::multipart(
            "/data/update_dataset",
            &[("dataset_id", form.dataset_id.as_str())],
            file,
        ))
        .await?
        .json()
    }

    pub async fn download_dataset(&self, form: DatasetIdForm) -> ActionResult<Table> {
        let form = validated(form)?;

        let body = self
            .call(ApiRequest::form(
                "/data/download_dataset",
                &[("dataset_id", form.dataset_id.as_str())],
            ))
            .await?
            .into_success()?;

        Table::parse(&body).map_err(ActionError::malformed_response)
    }

    /// Irreversible. Refused outright unless the operator has acknowledged it.
    pub async fn delete_dataset(&self, form: DatasetIdForm, acknowledged: bool) -> ActionResult<Value> {
        if !acknowledged {
            warn!("Dataset delete attempted without acknowledgement");
            return Err(ActionError::ConfirmationRequired);
        }
        let form = validated(form)?;

        self.call(ApiRequest::form(
            "/data/delete_dataset",
            &[("dataset_id", form.dataset_id.as_str())],
        ))
        .await?
        .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::mock::RecordingTransport;
    use crate::services::backend::RequestBody;
    use serde_json::json;

    fn service(transport: &Arc<RecordingTransport>) -> DatasetService {
        DatasetService::new(transport.clone(), "http://backend")
    }

    fn dataset_file() -> UploadedFile {
        UploadedFile::new("iris.csv", b"a,b,target\n1,2,0\n".to_vec())
    }

    fn id_form(id: &str) -> DatasetIdForm {
        DatasetIdForm {
            dataset_id: id.to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_upload_returns_id_and_name() {
        let transport = Arc::new(RecordingTransport::new());
        transport.reply_json(json!({"dataset_id": "d-1", "dataset_name": "iris.csv", "shape": [1, 3]}));

        let dataset = service(&transport)
            .upload_dataset(Some(dataset_file()))
            .await
            .unwrap();
        assert_eq!(dataset.dataset_id, "d-1");
        assert_eq!(dataset.dataset_name, "iris.csv");
        assert_eq!(dataset.extra["shape"], json!([1, 3]));

        let requests = transport.requests();
        assert!(matches!(requests[0].1.body, RequestBody::Multipart { .. }));
    }

    #[actix_rt::test]
    async fn test_upload_without_file_is_rejected() {
        let transport = Arc::new(RecordingTransport::new());
        let err = service(&transport).upload_dataset(None).await.unwrap_err();
        assert_eq!(err, ActionError::MissingFile);
        assert_eq!(transport.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_update_needs_id_and_file() {
        let transport = Arc::new(RecordingTransport::new());
        let svc = service(&transport);

        let err = svc.update_dataset(" ", Some(dataset_file())).await.unwrap_err();
        assert_eq!(err, ActionError::MissingFields(vec!["dataset_id"]));
        let err = svc.update_dataset("d-1", None).await.unwrap_err();
        assert_eq!(err, ActionError::MissingFile);
        assert_eq!(transport.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_download_previews_and_reencodes() {
        let transport = Arc::new(RecordingTransport::new());
        transport.reply(200, "a,b,target\n1,2,0\n3,4,1\n");

        let table = service(&transport)
            .download_dataset(id_form("d-1"))
            .await
            .unwrap();
        assert_eq!(table.shape(), (2, 3));

        let again = Table::parse(&table.to_csv().unwrap()).unwrap();
        assert_eq!(again.rows.len(), 2);
    }

    #[actix_rt::test]
    async fn test_download_with_empty_id_is_not_sent() {
        let transport = Arc::new(RecordingTransport::new());
        let err = service(&transport)
            .download_dataset(id_form(""))
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::MissingFields(vec!["dataset_id"]));
        assert_eq!(transport.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_download_server_error_is_verbatim() {
        let transport = Arc::new(RecordingTransport::new());
        transport.reply(500, "dataset storage unavailable");

        let err = service(&transport)
            .download_dataset(id_form("d-1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "dataset storage unavailable");
    }

    #[actix_rt::test]
    async fn test_delete_is_refused_without_acknowledgement_every_time() {
        let transport = Arc::new(RecordingTransport::new());
        let svc = service(&transport);

        for _ in 0..5 {
            let err = svc.delete_dataset(id_form("d-1"), false).await.unwrap_err();
            assert_eq!(err, ActionError::ConfirmationRequired);
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_delete_with_acknowledgement() {
        let transport = Arc::new(RecordingTransport::new());
        transport.reply_json(json!({"message": "dataset d-1 deleted"}));
        let svc = service(&transport);

        let err = svc.delete_dataset(id_form(""), true).await.unwrap_err();
        assert_eq!(err, ActionError::MissingFields(vec!["dataset_id"]));

        let payload = svc.delete_dataset(id_form("d-1"), true).await.unwrap();
        assert_eq!(payload["message"], "dataset d-1 deleted");
        assert_eq!(transport.call_count(), 1);
    }
}
