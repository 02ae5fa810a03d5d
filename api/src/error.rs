use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage init: {0}")]
    Init(#[source] sqlx::Error),
    #[error("write entry: {0}")]
    Write(#[source] sqlx::Error),
    #[error("read entries: {0}")]
    Read(#[source] sqlx::Error),
    #[error("no entries")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage call canceled after {0:?}")]
    Canceled(std::time::Duration),
}

/// Errors a handler can return. Client mistakes map to 4xx with a safe
/// message; storage failures carry their text through as a 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad auth")]
    Auth,
    #[error("bad json")]
    Decode,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("missing start or end")]
    MissingRange,
    #[error("{0}")]
    BadDate(#[from] chrono::ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::Decode
            | ApiError::Validation(_)
            | ApiError::MissingRange
            | ApiError::BadDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}
