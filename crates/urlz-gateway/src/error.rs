use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};
use urlz_generator::GeneratorError;
use urlz_ratelimit::RateLimitError;
use urlz_shortener::ShortenerError;

pub type Result<T> = std::result::Result<T, AppError>;

pub const URL_NOT_FOUND: &str = "URL not found";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),
    #[error("path id {path} does not match payload id {payload}")]
    IdMismatch { path: String, payload: String },
    #[error("missing or wrong internal secret")]
    Forbidden,
    #[error("url not found")]
    NotFound,
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload(rejection.body_text())
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "Invalid request payload"),
            AppError::IdMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                "Path ID and payload ID do not match",
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::NotFound => (StatusCode::NOT_FOUND, URL_NOT_FOUND),
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "Invalid URL format"),
                ShortenerError::NotFound(_) => (StatusCode::NOT_FOUND, URL_NOT_FOUND),
                ShortenerError::UrlMismatch(_) => (StatusCode::BAD_REQUEST, "URL mismatch"),
                ShortenerError::Conflict(_) => (StatusCode::CONFLICT, "Short ID already exists"),
                ShortenerError::Generator(GeneratorError::Cancelled) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Server is shutting down",
                ),
                ShortenerError::Generator(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate short ID",
                ),
                ShortenerError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
            },
            AppError::RateLimit(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            info!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urlz_core::StorageError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::IdMismatch {
                path: "a".into(),
                payload: "b".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ShortenerError::UrlMismatch("a".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ShortenerError::NotFound("a".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ShortenerError::Storage(StorageError::Unavailable("down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ShortenerError::Generator(GeneratorError::Cancelled).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                ShortenerError::Generator(GeneratorError::UniquenessExhausted { attempts: 1337 })
                    .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
