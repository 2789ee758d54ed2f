use crate::envelope::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type ServerResult<T> = Result<T, ServerError>;

/// Infrastructure failures. Rendered as a 500 envelope when they reach a client.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The request itself could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Not found.")]
    UnknownRoute,
}

impl ProtocolError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Domain-level failures keep 200; clients branch on `success`.
            ProtocolError::MalformedBody(_) => StatusCode::OK,
            ProtocolError::UnknownRoute => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ProtocolError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Envelope::failure(self.to_string())).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Envelope::failure(self.to_string()),
        )
            .into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            ServerError::Internal("worker panicked".to_string())
        } else {
            ServerError::Internal(format!("worker cancelled: {err}"))
        }
    }
}
