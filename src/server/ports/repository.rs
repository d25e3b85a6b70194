//! Repository port for server persistence and discovery.

use crate::envelope::{Classify, ErrorClass};
use crate::pagination::{Page, PageRequest};
use crate::server::domain::{Server, ServerId, ServerKind, ServerKindTag, ServerName, ServerRef};
use crate::status::Status;
use crate::store::BudgetExceeded;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for server repository operations.
pub type ServerRepositoryResult<T> = Result<T, ServerRepositoryError>;

/// Listing filter for servers of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerFilter {
    /// Case-insensitive substring the name must contain.
    pub keyword: Option<String>,
    /// Exact status the server must have.
    pub status: Option<Status>,
}

impl ServerFilter {
    /// Returns `true` when `server` passes the filter.
    #[must_use]
    pub fn matches<K: ServerKind>(&self, server: &Server<K>) -> bool {
        let keyword_matches = self
            .keyword
            .as_deref()
            .is_none_or(|keyword| server.name().contains_ignore_case(keyword));
        let status_matches = self.status.is_none_or(|status| server.status() == status);
        keyword_matches && status_matches
    }
}

/// Server persistence contract for servers of kind `K`.
///
/// Implementations enforce name uniqueness within the kind themselves, so
/// concurrent registrations of the same name resolve to exactly one success.
#[async_trait]
pub trait ServerRepository<K: ServerKind>: Send + Sync {
    /// Stores a new server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::DuplicateServer`] when the identifier
    /// already exists or [`ServerRepositoryError::DuplicateName`] when the
    /// name is already registered for this kind.
    async fn insert(&self, server: &Server<K>) -> ServerRepositoryResult<()>;

    /// Renames a server, stamping `at`, and returns the stored record.
    ///
    /// Only the name and `updated_at` are written; the stored status is
    /// left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::NotFound`] when the server does not
    /// exist or [`ServerRepositoryError::DuplicateName`] when another server
    /// of this kind already holds the name.
    async fn rename(
        &self,
        id: ServerId<K>,
        name: &ServerName,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>>;

    /// Sets a server's status, stamping `at`, and returns the stored record.
    ///
    /// Only the status and `updated_at` are written.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::NotFound`] when the server does not
    /// exist.
    async fn set_status(
        &self,
        id: ServerId<K>,
        status: Status,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>>;

    /// Finds a server by identifier.
    ///
    /// Returns `None` when the server does not exist.
    async fn find_by_id(&self, id: ServerId<K>) -> ServerRepositoryResult<Option<Server<K>>>;

    /// Returns one page of servers matching `filter`, in creation order,
    /// with the total number of matches.
    async fn list(
        &self,
        filter: &ServerFilter,
        page: PageRequest,
    ) -> ServerRepositoryResult<Page<Server<K>>>;
}

/// Errors returned by server repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ServerRepositoryError {
    /// A server with the same identifier already exists.
    #[error("duplicate server identifier: {0}")]
    DuplicateServer(ServerRef),

    /// A server of the same kind already has this name.
    #[error("{} name already exists: {name}", kind.label())]
    DuplicateName {
        /// Kind whose namespace holds the name.
        kind: ServerKindTag,
        /// Conflicting name.
        name: ServerName,
    },

    /// The server was not found.
    #[error("{0} not found")]
    NotFound(ServerRef),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// The store did not answer within the operation budget.
    #[error("server store timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ServerRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BudgetExceeded> for ServerRepositoryError {
    fn from(exceeded: BudgetExceeded) -> Self {
        Self::Timeout(exceeded.0)
    }
}

impl Classify for ServerRepositoryError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::DuplicateServer(_) | Self::DuplicateName { .. } => ErrorClass::Conflict,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::InvalidPersistedData(_) | Self::Timeout(_) | Self::Persistence(_) => {
                ErrorClass::Store
            }
        }
    }
}
