use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single event produced no actions. Never fatal to a compilation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no selector could be derived for the event target")]
    UnresolvableSelector,

    #[error("field edits need a CSS selector, only visible text was found")]
    TextLocatorUnsupported,

    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    #[error("task-start event has no navigation history")]
    MissingStartUrl,

    #[error("navigation event has no destination url")]
    MissingNavigationUrl,

    #[error("submit event has no allEvents payload")]
    EmptySubmission,
}

/// Stream-level precondition failures; no plan is produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("no events to compile")]
    EmptyStream,

    #[error("no task-start event found")]
    MissingTaskStart,

    #[error("multiple task-start events detected: {}", .0.join(", "))]
    MultipleTaskStarts(Vec<String>),

    #[error("first event is not a task-start record ({location} is '{found}')")]
    TaskStartNotFirst { location: String, found: String },

    #[error("task-start {0} has no taskDescription or taskId")]
    MissingTaskMetadata(String),
}

/// Failures reading or writing recorded events and bundles
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("given path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no *.json files found under {0}")]
    NoEventFiles(PathBuf),

    #[error("invalid task id '{0}'")]
    InvalidTaskId(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the collection server
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            AppError::Store(StoreError::InvalidTaskId(_)) => (StatusCode::BAD_REQUEST, "Bad Request"),
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            AppError::Compile(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Compile Error"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
