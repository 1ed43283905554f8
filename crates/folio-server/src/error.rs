//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_cache::SeedError;
use folio_renderer::{RenderError, TemplateError};

/// Error raised while handling a request.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Blocking lookup task panicked or was cancelled.
    #[error("Lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Error that prevents the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A configured default page could not be loaded.
    #[error("{0}")]
    Seed(#[from] SeedError),

    /// The page template could not be loaded.
    #[error("{0}")]
    Template(#[from] TemplateError),

    /// The category routing pattern failed to compile.
    #[error("Invalid category pattern: {0}")]
    Dispatch(#[from] regex::Error),

    /// Listen address could not be parsed.
    #[error("Invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// I/O error while binding or serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_render_error_is_internal_server_error() {
        let err = ServerError::from(RenderError::Io(io::Error::other("sink closed")));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_startup_error_display_passes_through_template_error() {
        let err = StartupError::from(TemplateError::Unterminated { offset: 7 });

        assert_eq!(err.to_string(), "Unterminated placeholder at byte 7");
    }
}
