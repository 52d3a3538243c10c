use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use taskdeck_shared::ValidationErrors;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Task not found")]
    NotFound,

    #[error("Access denied")]
    Forbidden,

    #[error("Missing or invalid credentials")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON body of every error response. The HTTP status travels alongside
/// the body and is never serialized.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status).json(self)
    }
}

impl ResponseError for TaskError {
    fn status_code(&self) -> StatusCode {
        match self {
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::NotFound | TaskError::UserNotFound => StatusCode::NOT_FOUND,
            TaskError::Forbidden => StatusCode::FORBIDDEN,
            TaskError::Unauthorized => StatusCode::UNAUTHORIZED,
            TaskError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            TaskError::Validation(errors) => ErrorBody::new(status, "Validation failed")
                .with_errors(errors.errors().iter().map(ToString::to_string).collect()),
            TaskError::Store(error) => {
                log::error!("store failure: {error}");
                ErrorBody::new(status, "Internal server error")
            }
            other => ErrorBody::new(status, other.to_string()),
        };
        body.into_response()
    }
}
