//! Error Taxonomy
//!
//! Typed failures shared by the store, the index and the search service.
//! Every variant maps to one HTTP status so handlers can turn a failure into a
//! response without inspecting messages.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// Malformed segment input. Nothing from the rejected batch is stored or indexed.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("file not found: {0}")]
    NotFound(String),

    /// Empty query, or a query with no searchable tokens.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Store and index disagree about a file. Repaired by rebuilding from the store.
    #[error("index inconsistent with store for file {file_id}: {detail}")]
    IndexInconsistency { file_id: String, detail: String },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid status transition for {file_id}: {from} -> {to}")]
    InvalidStatusTransition {
        file_id: String,
        from: String,
        to: String,
    },
}

impl SearchError {
    /// Only backing-store unavailability is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::ServiceUnavailable(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::Validation(_) | SearchError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            SearchError::IndexInconsistency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable name used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Validation(_) => "validation_error",
            SearchError::NotFound(_) => "not_found",
            SearchError::InvalidQuery(_) => "invalid_query",
            SearchError::IndexInconsistency { .. } => "index_inconsistency",
            SearchError::ServiceUnavailable(_) => "service_unavailable",
            SearchError::InvalidStatusTransition { .. } => "invalid_status_transition",
        }
    }
}

/// Body of every failed HTTP response. Never confused with a zero-match result:
/// `success` is false and `error` is always present.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Adapter that lets handlers return `SearchError` with `?`.
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                kind: self.0.kind().to_string(),
                message: self.0.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
