//! Error types for connection domain validation and parsing.

use crate::server::domain::ServerDomainError;
use thiserror::Error;

/// Errors returned while constructing connection domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionDomainError {
    /// The identifier text is not a valid connection identifier.
    #[error("invalid connection identifier: {0:?}")]
    InvalidId(String),

    /// The webview server identifier was not supplied.
    #[error("webview server identifier is required")]
    MissingWebviewServerId,

    /// A server identifier could not be parsed.
    #[error(transparent)]
    InvalidServerId(#[from] ServerDomainError),

    /// The webhook is not an absolute URL with a host.
    #[error("invalid user delivery server webhook URL {url:?}: {reason}")]
    InvalidWebhookUrl {
        /// Rejected input.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },
}
