use thiserror::Error;

/// Failures fetching a fact. All of them are transient from the caller's
/// point of view.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain node unreachable: {0}")]
    Unavailable(String),

    #[error("chain node returned an error: {0}")]
    Rpc(String),

    #[error("malformed fact response: {0}")]
    Malformed(String),
}
