//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::LoadError;
use lingo_core::session::SessionError;
use lingo_core::validation::ValidationError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised while reading API configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid base URL in {var}: {value}")]
    InvalidBaseUrl { var: &'static str, value: String },
}

/// Failures talking to the backend, as seen by a page.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("you must be logged in")]
    AuthMissing,

    #[error(transparent)]
    ValidationFailure(#[from] ValidationError),

    #[error("server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Fatal errors end the page (redirect to login) and are never retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::AuthMissing)
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkFailure(_) => "An error occurred. Please try again.".to_string(),
            ApiError::AuthMissing => "You must be logged in to play.".to_string(),
            ApiError::ValidationFailure(err) => err.to_string(),
            ApiError::ServerRejected { message, .. } => message.clone(),
            ApiError::Storage(_) => "Could not read saved settings.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::ServerRejected {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ApiError::NetworkFailure(err.to_string()),
        }
    }
}

impl From<ApiError> for LoadError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NetworkFailure(detail) => LoadError::Network(detail),
            ApiError::ServerRejected { status: 404, .. } => LoadError::NotFound,
            ApiError::ServerRejected { status, message } => LoadError::Rejected { status, message },
            ApiError::AuthMissing => LoadError::Rejected {
                status: 401,
                message: "You must be logged in to play.".to_string(),
            },
            ApiError::ValidationFailure(inner) => LoadError::Rejected {
                status: 400,
                message: inner.to_string(),
            },
            ApiError::Storage(inner) => LoadError::Network(inner.to_string()),
        }
    }
}

/// Errors returned by game controllers and the flashcard pager.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no card in slot {0}")]
    UnknownSlot(usize),

    #[error("card in slot {0} is already matched")]
    AlreadyMatched(usize),
}

impl ControllerError {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ControllerError::Api(err) if err.is_fatal())
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::Api(err) => err.user_message(),
            ControllerError::Load(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for ControllerError {
    fn from(err: ValidationError) -> Self {
        ControllerError::Api(ApiError::ValidationFailure(err))
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
