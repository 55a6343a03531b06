//! API error types.

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{
    codec::CodecError,
    common::DecodeIdError,
    directory::DirectoryError,
    node::NodeError,
};

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid ID: {0}")]
    InvalidIdentifier(#[from] DecodeIdError),

    #[error("{0}")]
    MissingField(&'static str),

    /// A path segment could not be extracted, e.g. it is not valid UTF-8.
    #[error("{message}: {source}")]
    InvalidPath {
        message: &'static str,
        #[source]
        source: PathRejection,
    },

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Stored bytes could not be decoded into the expected record.
    #[error("Invalid value format")]
    MalformedValue(#[source] CodecError),

    #[error("{message}")]
    NotFound {
        message: &'static str,
        username: Option<String>,
    },

    /// The node rejected the operation, its message is echoed to the caller.
    #[error("{0}")]
    StoreFailure(#[from] NodeError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound {
            message,
            username: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_)
            | Self::InvalidPath { .. }
            | Self::MissingField(_)
            | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedValue(_) | Self::StoreFailure(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::Node(error) => Self::StoreFailure(error),
            DirectoryError::Codec(error @ CodecError::MalformedValue(_)) => {
                Self::MalformedValue(error)
            }
            DirectoryError::Codec(error) => Self::Internal(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            match &self {
                Self::MalformedValue(source) => error!(error = %self, %source, "Request failed"),
                _ => error!(error = %self, "Request failed"),
            }
        }

        let username = match &self {
            Self::NotFound { username, .. } => username.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            username,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
