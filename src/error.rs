use crate::services::ModelError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Cannot access stats of this video: {0}")]
    Forbidden(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Stats model error: {0}")]
    Model(#[from] ModelError),
}

impl StatsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatsError::Unauthorized => StatusCode::UNAUTHORIZED,
            StatsError::Forbidden(_) => StatusCode::FORBIDDEN,
            StatsError::VideoNotFound(_) => StatusCode::NOT_FOUND,
            StatsError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            StatsError::Model(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StatsError::Unauthorized => "UNAUTHORIZED",
            StatsError::Forbidden(_) => "FORBIDDEN",
            StatsError::VideoNotFound(_) => "VIDEO_NOT_FOUND",
            StatsError::InvalidParameter(_) => "INVALID_PARAMETER",
            StatsError::Model(_) => "UPSTREAM_ERROR",
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let error_code = self.error_code();

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        if status.is_server_error() {
            tracing::error!(
                error = ?self,
                error_code = error_code,
                "Request failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                "Request rejected"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_failures_map_to_bad_gateway() {
        let err = StatsError::from(ModelError::Status {
            status: 500,
            body: "boom".to_string(),
        });

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rejections_keep_client_status_codes() {
        assert_eq!(StatsError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            StatsError::Forbidden("7".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            StatsError::VideoNotFound("42".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StatsError::InvalidParameter("metric".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn only_model_failures_are_server_errors() {
        let errors = [
            StatsError::Unauthorized,
            StatsError::Forbidden("7".into()),
            StatsError::VideoNotFound("42".into()),
            StatsError::InvalidParameter("metric".into()),
            StatsError::Model(ModelError::Decode("bad".into())),
        ];

        let server_errors: Vec<_> = errors
            .iter()
            .filter(|e| e.status_code().is_server_error())
            .map(|e| e.error_code())
            .collect();
        assert_eq!(server_errors, vec!["UPSTREAM_ERROR"]);
    }
}
