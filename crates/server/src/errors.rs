use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::{ErrorKind, ServiceError};
use thiserror::Error;
use tracing::error;

/// Failure envelope: `{ "success": false, "error": ..., "detail"?: ... }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidId | ErrorKind::MissingFields | ErrorKind::InvalidPlays | ErrorKind::EmptyField => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateName => StatusCode::CONFLICT,
        ErrorKind::StoreUnavailable | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }

    /// Map a service failure. Internal errors get a generic
    /// `failed to <action>` message; the driver text is only attached as
    /// `detail` when `expose_details` is set.
    pub fn from_service(err: ServiceError, action: &str, expose_details: bool) -> Self {
        let kind = err.kind();
        let status = status_for(kind);
        match kind {
            ErrorKind::Internal => {
                error!(err = %err, action, "song operation failed");
                let detail = expose_details.then(|| err.to_string());
                Self::new(status, format!("failed to {action}"), detail)
            }
            _ => Self::new(status, err.to_string(), None),
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { success: false, error: &self.error, detail: self.detail.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_status() {
        assert_eq!(status_for(ErrorKind::StoreUnavailable), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::InvalidId), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::MissingFields), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidPlays), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::EmptyField), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::DuplicateName), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_detail_depends_on_environment() {
        let hidden = JsonApiError::from_service(ServiceError::Db("socket closed".into()), "create song", false);
        assert_eq!(hidden.error, "failed to create song");
        assert!(hidden.detail.is_none());

        let shown = JsonApiError::from_service(ServiceError::Db("socket closed".into()), "create song", true);
        assert_eq!(shown.detail.as_deref(), Some("database error: socket closed"));
    }

    #[test]
    fn domain_errors_keep_their_message() {
        let e = JsonApiError::from_service(ServiceError::DuplicateName, "create song", true);
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.error, "a song with that name already exists");
        assert!(e.detail.is_none());
    }
}
