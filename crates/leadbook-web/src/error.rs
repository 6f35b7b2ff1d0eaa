//! Error handling for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::render;

/// Error type returned by handlers and the access guard.
#[derive(Debug)]
pub enum WebError {
    /// Viewer lacks the permission for the attempted action.
    AccessDenied,
    /// The routed lead does not exist. Responds with a redirect to the lead
    /// index; the guard has already queued the explanatory flash.
    LeadNotFound { lead_id: i64 },
    /// No authenticated user on the request.
    Unauthorized(String),
    /// A routed entity other than the lead is missing.
    NotFound(String),
    /// Malformed request data.
    BadRequest(String),
    /// Repository failure.
    Database(leadbook_core::Error),
}

impl From<leadbook_core::Error> for WebError {
    fn from(err: leadbook_core::Error) -> Self {
        match &err {
            leadbook_core::Error::NotFound(msg) => WebError::NotFound(msg.clone()),
            leadbook_core::Error::NoteNotFound(id) => {
                WebError::NotFound(format!("Note {} not found", id))
            }
            leadbook_core::Error::LeadNotFound(id) => WebError::LeadNotFound { lead_id: *id },
            leadbook_core::Error::InvalidInput(msg) => WebError::BadRequest(msg.clone()),
            _ => WebError::Database(err),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::AccessDenied => render::html_error_response(
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.",
            ),
            WebError::LeadNotFound { lead_id } => {
                tracing::debug!(lead_id, "Redirecting to lead index for missing lead");
                Redirect::to("/leads").into_response()
            }
            WebError::Unauthorized(msg) => {
                render::html_error_response(StatusCode::UNAUTHORIZED, &msg)
            }
            WebError::NotFound(msg) => render::html_error_response(StatusCode::NOT_FOUND, &msg),
            WebError::BadRequest(msg) => {
                render::html_error_response(StatusCode::BAD_REQUEST, &msg)
            }
            WebError::Database(err) => {
                tracing::error!(error = %err, "Request failed");
                render::html_error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                )
            }
        }
    }
}
