//! HTTP error mapping: every failure becomes a status code and a JSON body

use crate::error::{ConvertError, ParseError, RenderError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email message: {0}")]
    Parse(#[from] ParseError),

    #[error("Request body exceeds the {0} MB limit")]
    PayloadTooLarge(usize),

    #[error("PDF rendering engine is not available: {0}")]
    EngineUnavailable(String),

    #[error("PDF rendering failed: {0}")]
    Render(RenderError),

    #[error("Conversion timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::EngineUnavailable(reason) => Self::EngineUnavailable(reason),
            other => Self::Render(other),
        }
    }
}

impl From<ConvertError> for ServiceError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Parse(e) => e.into(),
            ConvertError::Render(e) => e.into(),
        }
    }
}

impl ServiceError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Parse(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::EngineUnavailable(_) | Self::Render(_) | Self::Timeout(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Parse(_) => "ParseError",
            Self::PayloadTooLarge(_) => "PayloadTooLarge",
            Self::EngineUnavailable(_) => "EngineUnavailable",
            Self::Render(_) => "RenderError",
            Self::Timeout(_) => "Timeout",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!("{}", self);
                "An internal error occurred".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!("{}", self);
                self.to_string()
            }
            _ => {
                tracing::warn!("Rejected request: {}", self);
                self.to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
