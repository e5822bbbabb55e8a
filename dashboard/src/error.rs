use mlops_common::{CatalogError, HyperparamError};
use thiserror::Error;
use validator::ValidationErrors;

/// Why a dashboard action did not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("missing required field: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("select a file to upload")]
    MissingFile,

    #[error(transparent)]
    InvalidHyperparams(#[from] HyperparamError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("tick the confirmation box before deleting the dataset")]
    ConfirmationRequired,

    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any request was sent.
    Validation,
    /// Backend unreachable or its reply could not be decoded.
    Transport,
    /// Backend answered with a non-success status.
    Server,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::MissingFields(_)
            | ActionError::MissingFile
            | ActionError::InvalidHyperparams(_)
            | ActionError::Catalog(_)
            | ActionError::InvalidInput(_)
            | ActionError::ConfirmationRequired => ErrorKind::Validation,
            ActionError::Transport(_) => ErrorKind::Transport,
            ActionError::Server { .. } => ErrorKind::Server,
        }
    }

    pub fn malformed_response(detail: impl std::fmt::Display) -> Self {
        ActionError::Transport(format!("malformed response from API: {}", detail))
    }
}

impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<&'static str> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        ActionError::MissingFields(fields)
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(error: reqwest::Error) -> Self {
        ActionError::Transport(error.to_string())
    }
}

impl From<multer::Error> for ActionError {
    fn from(error: multer::Error) -> Self {
        ActionError::InvalidInput(format!("unreadable upload: {}", error))
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_display_body_verbatim() {
        let err = ActionError::Server {
            status: 404,
            message: "model not found".to_string(),
        };
        assert_eq!(err.to_string(), "model not found");
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_validation_kinds() {
        assert_eq!(ActionError::MissingFile.kind(), ErrorKind::Validation);
        assert_eq!(ActionError::ConfirmationRequired.kind(), ErrorKind::Validation);
        let err: ActionError = HyperparamError::Syntax("eof".into()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid structured data: eof");
    }

    #[test]
    fn test_missing_fields_message() {
        let err = ActionError::MissingFields(vec!["data_id", "model_id"]);
        assert_eq!(err.to_string(), "missing required field: data_id, model_id");
    }
}
