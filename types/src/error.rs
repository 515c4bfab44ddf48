//! Boundary validation errors for the fundamental types.

use thiserror::Error;

/// Raised when untrusted input cannot be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid subject id: {0}")]
    InvalidSubjectId(String),

    #[error("invalid admin identity: {0}")]
    InvalidAdmin(String),

    #[error("unknown subject kind: {0}")]
    UnknownSubjectKind(String),
}
