use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        tracing::error!("internal error: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog must contain at least one template")]
    Empty,

    #[error("task id {0} appears more than once in the catalog")]
    DuplicateId(String),

    #[error("simple template {0} cannot have sub-tasks")]
    SimpleWithSubtasks(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be an integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between 0 and 100, got {value}")]
    OutOfRange { name: &'static str, value: u32 },
}
