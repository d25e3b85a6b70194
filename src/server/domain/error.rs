//! Error types for server domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing server domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerDomainError {
    /// The server name is empty after trimming.
    #[error("server name must not be empty")]
    EmptyName,

    /// The server name exceeds the 255-character storage limit.
    #[error("server name exceeds 255 character limit: {0}")]
    NameTooLong(String),

    /// The identifier text is not a valid server identifier.
    #[error("invalid server identifier: {0:?}")]
    InvalidId(String),
}
