//! Error type shared by the pure logic modules.

use thiserror::Error;

/// Failure raised by a constructor or decoder in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    /// A numeric or structural precondition was violated at construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An encoded line could not be decoded.
    #[error("file format error: {0}")]
    FileFormat(String),
}

impl LogicError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        LogicError::InvalidArgument(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        LogicError::FileFormat(msg.into())
    }
}
