use crate::utils::error::SyncError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Handler error, rendered as `{"status": "error", "message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotFound { message } => ApiError::NotFound(message),
            SyncError::Validation { message } => ApiError::BadRequest(message),
            SyncError::Unauthorized { message } => ApiError::Unauthorized(message),
            SyncError::Forbidden { message } => ApiError::Forbidden(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_mapping() {
        assert_eq!(
            ApiError::from(SyncError::not_found("none")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SyncError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SyncError::Forbidden {
                message: "inactive".into()
            })
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(SyncError::MissingConfig {
                field: "SENDGRID_API_KEY".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
