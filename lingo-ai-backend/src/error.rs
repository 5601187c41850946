use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use language_utils::ErrorBody;

use crate::completion_cache::CompletionError;
use crate::openai::{ContentParseError, ProviderError};

/// Everything a handler can fail with. Rendered as `{ "error": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to parse OpenAI response as JSON")]
    Parse { raw: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ContentParseError> for ApiError {
    fn from(e: ContentParseError) -> Self {
        ApiError::Parse { raw: e.raw }
    }
}

impl From<CompletionError> for ApiError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Provider(e) => e.into(),
            CompletionError::Parse(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let raw = match &self {
            ApiError::Parse { raw } => Some(raw.clone()),
            _ => None,
        };
        if status.is_server_error() {
            log::error!("Request failed: {self} {}", raw.as_deref().unwrap_or_default());
        }
        let body = ErrorBody {
            error: self.to_string(),
            raw,
        };
        (status, Json(body)).into_response()
    }
}
