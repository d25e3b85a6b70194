//! Repository port for connection persistence and discovery.

use crate::connection::domain::{Connection, ConnectionId, ConnectionPair, WebhookUrl};
use crate::envelope::{Classify, ErrorClass};
use crate::pagination::{Page, PageRequest};
use crate::server::domain::{ServerId, ServerRef, UserDelivery, Webview};
use crate::status::Status;
use crate::store::BudgetExceeded;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for connection repository operations.
pub type ConnectionRepositoryResult<T> = Result<T, ConnectionRepositoryError>;

/// Listing filter for the connections of one user-delivery server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionFilter {
    /// User-delivery server whose connections are listed.
    pub user_delivery_server_id: ServerId<UserDelivery>,
    /// Exact webview server the connection must pair with.
    pub webview_server_id: Option<ServerId<Webview>>,
    /// Exact status the connection must have.
    pub status: Option<Status>,
}

impl ConnectionFilter {
    /// Creates a filter selecting every connection of a user-delivery
    /// server.
    #[must_use]
    pub const fn for_user_delivery(id: ServerId<UserDelivery>) -> Self {
        Self {
            user_delivery_server_id: id,
            webview_server_id: None,
            status: None,
        }
    }

    /// Returns `true` when `connection` passes the filter.
    #[must_use]
    pub fn matches(&self, connection: &Connection) -> bool {
        connection.user_delivery_server_id() == self.user_delivery_server_id
            && self
                .webview_server_id
                .is_none_or(|id| connection.webview_server_id() == id)
            && self.status.is_none_or(|status| connection.status() == status)
    }
}

/// Connection persistence contract.
///
/// Implementations enforce pair uniqueness themselves, so concurrent
/// creations for the same pair resolve to exactly one success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Stores a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionRepositoryError::DuplicateConnection`] when the
    /// identifier already exists or [`ConnectionRepositoryError::DuplicatePair`]
    /// when the server pair is already connected.
    async fn insert(&self, connection: &Connection) -> ConnectionRepositoryResult<()>;

    /// Replaces a connection's webhook, stamping `at`, and returns the
    /// stored record.
    ///
    /// Only the webhook and `updated_at` are written; the stored status is
    /// left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionRepositoryError::NotFound`] when the connection
    /// does not exist.
    async fn set_webhook_url(
        &self,
        id: ConnectionId,
        url: &WebhookUrl,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection>;

    /// Sets a connection's status, stamping `at`, and returns the stored
    /// record.
    ///
    /// Only the status and `updated_at` are written.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionRepositoryError::NotFound`] when the connection
    /// does not exist.
    async fn set_status(
        &self,
        id: ConnectionId,
        status: Status,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection>;

    /// Finds a connection by identifier.
    ///
    /// Returns `None` when the connection does not exist.
    async fn find_by_id(&self, id: ConnectionId) -> ConnectionRepositoryResult<Option<Connection>>;

    /// Returns one page of connections matching `filter`, in creation
    /// order, with the total number of matches.
    async fn list(
        &self,
        filter: &ConnectionFilter,
        page: PageRequest,
    ) -> ConnectionRepositoryResult<Page<Connection>>;

    /// Returns every connection referencing `server` on its side of the
    /// pair, whatever its status.
    async fn find_by_server(&self, server: ServerRef) -> ConnectionRepositoryResult<Vec<Connection>>;

    /// Sets the connection to inactive, stamping `at`, only if it is
    /// currently active.
    ///
    /// Returns `false` when the connection was not active at write time.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionRepositoryError::NotFound`] when the connection
    /// does not exist.
    async fn deactivate_if_active(
        &self,
        id: ConnectionId,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<bool>;
}

/// Errors returned by connection repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ConnectionRepositoryError {
    /// A connection with the same identifier already exists.
    #[error("duplicate connection identifier: {0}")]
    DuplicateConnection(ConnectionId),

    /// The server pair is already connected.
    #[error("connection already exists for {0}")]
    DuplicatePair(ConnectionPair),

    /// The connection was not found.
    #[error("connection not found: {0}")]
    NotFound(ConnectionId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// The store did not answer within the operation budget.
    #[error("connection store timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConnectionRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BudgetExceeded> for ConnectionRepositoryError {
    fn from(exceeded: BudgetExceeded) -> Self {
        Self::Timeout(exceeded.0)
    }
}

impl Classify for ConnectionRepositoryError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::DuplicateConnection(_) | Self::DuplicatePair(_) => ErrorClass::Conflict,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::InvalidPersistedData(_) | Self::Timeout(_) | Self::Persistence(_) => {
                ErrorClass::Store
            }
        }
    }
}
