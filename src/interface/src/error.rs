//! Error types

use thiserror::Error;

/// Errors that may be returned while building token lock instructions
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TokenLockError {
    /// Malformed or out-of-range caller input, detected before any bytes are produced
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),
    /// An internal encoding invariant was violated
    #[error("SerializationFailure: {0}")]
    SerializationFailure(String),
}

impl TokenLockError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        TokenLockError::InvalidArgument(msg.into())
    }
}
