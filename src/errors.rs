use axum::http::StatusCode;
use thiserror::Error;

/// Pre-persistence form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project must not be empty")]
    EmptyProject,
    #[error("work time must be greater than zero")]
    ZeroWorkTime,
    #[error("{0} must be at least 30 characters")]
    TextTooShort(&'static str),
}

/// Failures surfaced by the log repository. Nothing here is fatal; every
/// variant maps to a response the caller can branch on.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("a log for this project already exists on this day")]
    Duplicate,
    #[error("log entry not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to persist local data")]
    Storage(#[from] std::io::Error),
    #[error("cloud request failed, please try again")]
    Remote,
    #[error("cloud returned an unreadable record: {0}")]
    Decode(String),
    #[error("sign in to use cloud storage")]
    NotSignedIn,
}

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

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        let status = match &err {
            RepoError::Duplicate => StatusCode::CONFLICT,
            RepoError::NotFound => StatusCode::NOT_FOUND,
            RepoError::Validation(_) | RepoError::NotSignedIn => StatusCode::BAD_REQUEST,
            RepoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RepoError::Remote | RepoError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
