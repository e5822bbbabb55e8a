use actix_web::web::Bytes;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ActionError, ActionResult};

/// A file received from the browser, ready to be forwarded to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn is_csv(&self) -> bool {
        self.extension().as_deref() == Some("csv")
    }

    pub fn is_parquet(&self) -> bool {
        self.extension().as_deref() == Some("parquet")
    }
}

fn guess_content_type(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => mime::TEXT_CSV.to_string(),
        Some("json") => mime::APPLICATION_JSON.to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

/// Text fields and the (optional) file part of a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Trimmed text field, empty when absent.
    pub fn field(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    /// Parses a buffered body. Browsers submit an empty, unnamed file part
    /// when nothing was picked; that is treated as no file.
    pub async fn parse(content_type: &str, body: Bytes) -> ActionResult<Self> {
        let boundary = multer::parse_boundary(content_type)?;
        let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(|mime| mime.to_string());
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() || bytes.is_empty() {
                        continue;
                    }
                    let mut file = UploadedFile::new(file_name, bytes.to_vec());
                    if let Some(content_type) = content_type {
                        file.content_type = content_type;
                    }
                    form.file = Some(file);
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn require_file(&mut self) -> ActionResult<UploadedFile> {
        self.file.take().ok_or(ActionError::MissingFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn body(parts: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut out = String::new();
        for (name, file_name, content) in parts {
            out.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, file_name
                )),
                None => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            out.push_str(content);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        Bytes::from(out)
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[actix_rt::test]
    async fn test_parses_fields_and_file() {
        let payload = body(&[
            ("model_id", None, " m-1 "),
            ("file", Some("rows.csv"), "a,b\n1,2\n"),
        ]);
        let mut form = MultipartForm::parse(&content_type(), payload).await.unwrap();

        assert_eq!(form.field("model_id"), "m-1");
        assert_eq!(form.field("missing"), "");
        let file = form.require_file().unwrap();
        assert_eq!(file.file_name, "rows.csv");
        assert_eq!(file.content_type, "text/csv");
        assert_eq!(file.bytes, b"a,b\n1,2\n");
        assert!(file.is_csv());
        assert!(!file.is_parquet());
    }

    #[test]
    fn test_parquet_extension_is_case_insensitive() {
        assert!(UploadedFile::new("train.PARQUET", vec![]).is_parquet());
        assert!(!UploadedFile::new("train.parquet.csv", vec![]).is_parquet());
    }

    #[actix_rt::test]
    async fn test_empty_file_part_is_no_file() {
        let payload = body(&[("dataset_id", None, "d-1"), ("file", Some(""), "")]);
        let mut form = MultipartForm::parse(&content_type(), payload).await.unwrap();
        assert_eq!(form.require_file().unwrap_err(), ActionError::MissingFile);
    }

    #[actix_rt::test]
    async fn test_rejects_non_multipart_content_type() {
        let result = MultipartForm::parse("application/x-www-form-urlencoded", Bytes::new()).await;
        assert!(matches!(result, Err(ActionError::InvalidInput(_))));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(UploadedFile::new("x.CSV", vec![]).content_type, "text/csv");
        assert_eq!(
            UploadedFile::new("x.parquet", vec![]).content_type,
            "application/octet-stream"
        );
    }
}
