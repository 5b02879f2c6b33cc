use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::models::ErrorResponse;
use crate::error::{ContentError, SessionError};

#[derive(Debug)]
pub enum ApiError {
    Content(ContentError),
    Session(SessionError),
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        ApiError::Content(err)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            ApiError::Content(ContentError::Validation { field, .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", Some(*field))
            }
            ApiError::Content(ContentError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", None)
            }
            ApiError::Content(ContentError::StoreUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", None)
            }
            ApiError::Content(ContentError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", None)
            }
            ApiError::Session(SessionError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", None)
            }
            ApiError::Session(SessionError::Persistence(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", None)
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Content(err) => err.to_string(),
            ApiError::Session(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, field) = self.parts();
        let message = self.message();
        if status.is_server_error() {
            log::error!("request failed: {}", message);
        } else {
            log::warn!("request rejected ({}): {}", code, message);
        }
        (
            status,
            Json(ErrorResponse {
                code: Some(code.to_string()),
                message,
                field: field.map(str::to_string),
            }),
        )
            .into_response()
    }
}
