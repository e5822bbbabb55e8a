//! Outbound HTTP to the model-serving API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ActionError, ActionResult};
use crate::models::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Multipart {
        fields: Vec<(String, String)>,
        file: UploadedFile,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path below the API prefix, e.g. `/models/health`.
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.to_string(),
            body: RequestBody::Empty,
        }
    }

    pub fn form(path: &str, fields: &[(&str, &str)]) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.to_string(),
            body: RequestBody::Form(owned_fields(fields)),
        }
    }

    pub fn multipart(path: &str, fields: &[(&str, &str)], file: UploadedFile) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.to_string(),
            body: RequestBody::Multipart {
                fields: owned_fields(fields),
                file,
            },
        }
    }
}

fn owned_fields(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body bytes of a 2xx reply; anything else becomes a server error
    /// carrying the body text unchanged.
    pub fn into_success(self) -> ActionResult<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ActionError::Server {
                status: self.status,
                message: self.text(),
            })
        }
    }

    pub fn json<T: DeserializeOwned>(self) -> ActionResult<T> {
        let body = self.into_success()?;
        serde_json::from_slice(&body).map_err(ActionError::malformed_response)
    }
}

/// One request in, one response out. No retries, no caching.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, base_url: &str, request: ApiRequest) -> ActionResult<ApiResponse>;
}

/// `reqwest`-backed transport. Requests carry no timeout; a call runs until
/// the backend answers or the connection fails.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_prefix: String,
}

impl HttpTransport {
    pub fn new(api_prefix: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_prefix: api_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, base_url: &str, path: &str) -> String {
        format!("{}{}{}", base_url.trim_end_matches('/'), self.api_prefix, path)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, base_url: &str, request: ApiRequest) -> ActionResult<ApiResponse> {
        let url = self.url(base_url, &request.path);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart { fields, file } => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k, v))
                    .part("file", part);
                builder.multipart(form)
            }
        };

        debug!("{:?} {}", request.method, url);
        let response = builder.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            ActionError::Transport(format!("cannot reach API at {}: {}", url, e))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!("{} answered {} ({} bytes)", url, status, body.len());

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory transport that records requests and replays canned replies.
    #[derive(Default)]
    pub struct RecordingTransport {
        requests: Mutex<Vec<(String, ApiRequest)>>,
        replies: Mutex<VecDeque<ActionResult<ApiResponse>>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
            self.replies.lock().unwrap().push_back(Ok(ApiResponse {
                status,
                body: body.into(),
            }));
            self
        }

        pub fn reply_json(&self, value: serde_json::Value) -> &Self {
            self.reply(200, value.to_string())
        }

        pub fn fail(&self, message: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(ActionError::Transport(message.to_string())));
            self
        }

        pub fn requests(&self) -> Vec<(String, ApiRequest)> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ApiTransport for RecordingTransport {
        async fn send(&self, base_url: &str, request: ApiRequest) -> ActionResult<ApiResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((base_url.to_string(), request));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ActionError::Transport("no reply queued".to_string())))
        }
    }
}
