//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dareboard_verification::VerificationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} is disabled")]
    Disabled(&'static str),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Verification(e) => match e {
                VerificationError::InvalidAddress(_) => "invalid_address",
                VerificationError::InvalidInput(_) => "invalid_request",
                VerificationError::DuplicateClaim(_) => "duplicate_claim",
                VerificationError::ChainUnavailable(_) => "chain_unavailable",
                VerificationError::SubjectNotFound(_) => "subject_not_found",
                VerificationError::DuplicateSubject(_) => "duplicate_subject",
                VerificationError::Conflict(_) => "conflict",
                VerificationError::OutcomeKindMismatch { .. } => "outcome_kind_mismatch",
                VerificationError::NoRecord(_) => "no_record",
                VerificationError::NotReviewable { .. } => "not_reviewable",
                VerificationError::UnknownAdmin(_) => "unknown_admin",
                VerificationError::Store(_) => "store",
            },
            Self::InvalidRequest(_) => "invalid_request",
            Self::Disabled(_) => "disabled",
            Self::Metrics(_) | Self::Server(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Verification(e) => match e {
                VerificationError::InvalidAddress(_)
                | VerificationError::InvalidInput(_)
                | VerificationError::OutcomeKindMismatch { .. } => StatusCode::BAD_REQUEST,
                VerificationError::SubjectNotFound(_) | VerificationError::NoRecord(_) => {
                    StatusCode::NOT_FOUND
                }
                VerificationError::DuplicateClaim(_)
                | VerificationError::DuplicateSubject(_)
                | VerificationError::Conflict(_)
                | VerificationError::NotReviewable { .. } => StatusCode::CONFLICT,
                VerificationError::UnknownAdmin(_) => StatusCode::FORBIDDEN,
                VerificationError::ChainUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                VerificationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Disabled(_) => StatusCode::NOT_FOUND,
            Self::Metrics(_) | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<dareboard_types::TypeError> for RpcError {
    fn from(e: dareboard_types::TypeError) -> Self {
        Self::Verification(e.into())
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
