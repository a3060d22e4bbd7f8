//! Error types for the HTTP server.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request path does not map to a file under the root.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// HTML file is not valid UTF-8.
    #[error("Invalid UTF-8 in HTML file: {0}")]
    Decode(#[from] FromUtf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listener could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// Filesystem watcher could not be created.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Watcher was started twice.
    #[error("Watcher already started")]
    AlreadyStarted,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::FileNotFound(_) | Self::Decode(_) | Self::Io(_) => StatusCode::NOT_FOUND,
            Self::Bind { .. } | Self::Watch(_) | Self::AlreadyStarted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        status.into_response()
    }
}
