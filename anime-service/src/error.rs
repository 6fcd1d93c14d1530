//! Error types and HTTP response conversion
//!
//! Every failure leaves the service as a problem-detail JSON body:
//!
//! ```json
//! {
//!   "timestamp": "2024-01-01T00:00:00Z",
//!   "path": "/anime/1",
//!   "status": 404,
//!   "error": "Not Found",
//!   "message": "Anime 1 not found",
//!   "developerMessage": "A ResponseStatusErrorException Happened"
//! }
//! ```
//!
//! Only [`Error::NotFound`] knows its own `path`; for every other failure the
//! [`problem_details`](crate::middleware::problem_details) middleware fills in
//! the request path on the way out.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blocking::BlockingOperationError;
use crate::repository::RepositoryError;

/// Developer-facing message attached to every client error.
///
/// Kept verbatim; API consumers match on it.
pub const DEVELOPER_MESSAGE: &str = "A ResponseStatusErrorException Happened";

const INTERNAL_DEVELOPER_MESSAGE: &str = "An internal error occurred";

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Store failure, surfaced unchanged from the repository layer
    #[error("{0}")]
    Repository(RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An id-keyed lookup found nothing
    #[error("{entity} {key} not found")]
    NotFound {
        /// Human-readable entity name (e.g. "Anime")
        entity: &'static str,
        /// Collection segment used to rebuild the resource path (e.g. "anime")
        collection: &'static str,
        /// The key that was looked up
        key: String,
    },

    /// A field failed a validation checkpoint
    #[error("{0}")]
    InvalidArgument(String),

    /// Malformed request (unparseable body or path parameter)
    #[error("{0}")]
    BadRequest(String),

    /// No route matches the request
    #[error("No handler found for this route")]
    RouteNotFound,

    /// The route exists but does not accept the request method
    #[error("Request method not supported for this route")]
    MethodNotAllowed,

    /// Request refused before reaching a handler (oversized body, wrong
    /// content type, timeout)
    #[error("{message}")]
    Rejected {
        /// Status chosen by the rejecting layer
        status: StatusCode,
        message: String,
    },

    /// Authentication error
    #[error("{0}")]
    Unauthorized(String),

    /// Authorization error
    #[error("{0}")]
    Forbidden(String),

    /// A blocking call was made while polling on an event thread
    #[error(transparent)]
    Blocking(#[from] BlockingOperationError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a `NotFound` failure for a keyed lookup
    pub fn not_found(
        entity: &'static str,
        collection: &'static str,
        key: impl ToString,
    ) -> Self {
        Self::NotFound {
            entity,
            collection,
            key: key.to_string(),
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Rejected { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Repository(err) if err.is_retriable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Repository(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Blocking(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Resource path echoed in the problem body, when the error knows it
    pub fn resource_path(&self) -> Option<String> {
        match self {
            Self::NotFound {
                collection, key, ..
            } => Some(format!("/{}/{}", collection, key)),
            _ => None,
        }
    }

    /// Message safe to show to API clients
    ///
    /// Server-side failures never leak their internals.
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            status if status.is_server_error() => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Problem-detail response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// When the failure was produced
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub timestamp: DateTime<Utc>,

    /// Request or resource path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// HTTP status code
    pub status: u16,

    /// Canonical reason phrase for the status
    pub error: String,

    /// Error message
    pub message: String,

    /// Request id, when request tracking is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Developer-facing message
    pub developer_message: String,
}

impl ProblemDetails {
    /// Create a problem body for the given status
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let developer_message = if status.is_client_error() {
            DEVELOPER_MESSAGE
        } else {
            INTERNAL_DEVELOPER_MESSAGE
        };

        Self {
            timestamp: Utc::now(),
            path: None,
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            message: message.into(),
            request_id: None,
            developer_message: developer_message.to_string(),
        }
    }

    /// Set the path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the request id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Status code carried by this body
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(&self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let mut problem = ProblemDetails::new(status, self.public_message());
        if let Some(path) = self.resource_path() {
            problem = problem.with_path(path);
        }

        problem.into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        Error::Repository(err)
    }
}
