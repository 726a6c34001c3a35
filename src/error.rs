//! The error type shared by the page functions on [`crate::site::Site`] and
//! the handlers that answer with them.

use crate::render;
use crate::status::UnexpectedStatus;
use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced while producing a page for a request.
#[derive(Error, Debug)]
pub enum AppError {
    /// A non-success status that should be answered with an error page.
    #[error("status {0}")]
    Status(StatusCode),

    /// A status without an error page reached the error-page layer.
    #[error(transparent)]
    Unexpected(#[from] UnexpectedStatus),

    #[error("rendering page: {0}")]
    Render(#[from] render::Error),
}

impl From<StatusCode> for AppError {
    fn from(status: StatusCode) -> AppError {
        AppError::Status(status)
    }
}
