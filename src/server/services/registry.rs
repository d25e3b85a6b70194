//! Service layer for server registration, discovery, and status changes.
//!
//! Provides [`ServerRegistryService`], one generic service instantiated once
//! per server kind. Deactivating a server hands over to the injected
//! [`DeactivationCascade`] before the call returns.

use crate::envelope::{Classify, ErrorClass};
use crate::pagination::{Page, PageRequest};
use crate::server::{
    domain::{Server, ServerDomainError, ServerId, ServerKind, ServerName, ServerSummary},
    ports::{
        CascadeError, DeactivationCascade, ServerFilter, ServerRepository, ServerRepositoryError,
    },
};
use crate::status::{ParseStatusError, Status};
use crate::store::StoreBudget;
use mockable::Clock;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Listing query for servers of one kind.
///
/// Filters are raw text as received from a caller. A status other than the
/// exact strings `active` and `inactive` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerListQuery {
    keyword: Option<String>,
    status: Option<String>,
    page: PageRequest,
}

impl ServerListQuery {
    /// Creates an unfiltered query for the given page.
    #[must_use]
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Restricts results to names containing `keyword`, ignoring case.
    /// An empty keyword leaves the query unfiltered.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let text = keyword.into();
        self.keyword = (!text.is_empty()).then_some(text);
        self
    }

    /// Restricts results to the given status text.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn into_parts(self) -> (ServerFilter, PageRequest) {
        let filter = ServerFilter {
            keyword: self.keyword,
            status: Status::filter(self.status.as_deref()),
        };
        (filter, self.page)
    }
}

/// Service-level errors for server registry operations.
#[derive(Debug, Error)]
pub enum ServerRegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ServerDomainError),
    /// The requested status is not recognised.
    #[error(transparent)]
    Status(#[from] ParseStatusError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ServerRepositoryError),
    /// The server was deactivated but dependent records were not all
    /// deactivated with it.
    #[error(transparent)]
    Cascade(#[from] CascadeError),
}

impl Classify for ServerRegistryServiceError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::Domain(_) | Self::Status(_) => ErrorClass::Validation,
            Self::Repository(err) => err.classify(),
            Self::Cascade(_) => ErrorClass::Store,
        }
    }
}

/// Result type for server registry service operations.
pub type ServerRegistryServiceResult<T> = Result<T, ServerRegistryServiceError>;

/// Registration and lifecycle orchestration for servers of kind `K`.
pub struct ServerRegistryService<K, R, D, C>
where
    K: ServerKind,
    R: ServerRepository<K>,
    D: DeactivationCascade,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    cascade: Arc<D>,
    clock: Arc<C>,
    budget: StoreBudget,
    kind: PhantomData<fn() -> K>,
}

impl<K, R, D, C> Clone for ServerRegistryService<K, R, D, C>
where
    K: ServerKind,
    R: ServerRepository<K>,
    D: DeactivationCascade,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cascade: Arc::clone(&self.cascade),
            clock: Arc::clone(&self.clock),
            budget: self.budget,
            kind: PhantomData,
        }
    }
}

impl<K, R, D, C> ServerRegistryService<K, R, D, C>
where
    K: ServerKind,
    R: ServerRepository<K>,
    D: DeactivationCascade,
    C: Clock + Send + Sync,
{
    /// Creates a new server registry service with the default store budget.
    #[must_use]
    pub fn new(repository: Arc<R>, cascade: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            cascade,
            clock,
            budget: StoreBudget::default(),
            kind: PhantomData,
        }
    }

    /// Replaces the time budget applied to each store interaction.
    #[must_use]
    pub const fn with_budget(mut self, budget: StoreBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Registers a new server with `Inactive` status.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Domain`] when the name is empty
    /// or too long, or [`ServerRegistryServiceError::Repository`] when the
    /// name is already taken or persistence fails.
    pub async fn create(&self, name: &str) -> ServerRegistryServiceResult<Server<K>> {
        let server_name = ServerName::new(name)?;
        let server = Server::new(server_name, &*self.clock);
        self.budget.run(self.repository.insert(&server)).await?;
        info!(
            kind = %K::TAG,
            server_id = %server.id(),
            name = %server.name(),
            "server registered"
        );
        Ok(server)
    }

    /// Returns one page of servers matching `query`, with the total number
    /// of matches.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Repository`] when persistence
    /// lookup fails.
    pub async fn list(&self, query: ServerListQuery) -> ServerRegistryServiceResult<Page<Server<K>>> {
        let (filter, page) = query.into_parts();
        Ok(self.budget.run(self.repository.list(&filter, page)).await?)
    }

    /// Returns the server with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Repository`] with
    /// [`ServerRepositoryError::NotFound`] when the server does not exist.
    pub async fn get(&self, id: ServerId<K>) -> ServerRegistryServiceResult<Server<K>> {
        self.find_by_id_or_error(id).await
    }

    /// Returns the `{id, name}` projection of a server.
    ///
    /// Returns `Ok(None)` when no server has the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Repository`] when persistence
    /// lookup fails.
    pub async fn find_summary(
        &self,
        id: ServerId<K>,
    ) -> ServerRegistryServiceResult<Option<ServerSummary<K>>> {
        let server = self.budget.run(self.repository.find_by_id(id)).await?;
        Ok(server.as_ref().map(Server::summary))
    }

    /// Renames a server. Renaming to the current name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Domain`] when the name is
    /// invalid, or [`ServerRegistryServiceError::Repository`] when the server
    /// does not exist, the name is held by another server, or persistence
    /// fails.
    pub async fn rename(&self, id: ServerId<K>, name: &str) -> ServerRegistryServiceResult<Server<K>> {
        let server_name = ServerName::new(name)?;
        let mut server = self.find_by_id_or_error(id).await?;

        if !server.rename(server_name, &*self.clock) {
            debug!(kind = %K::TAG, server_id = %id, "rename to current name ignored");
            return Ok(server);
        }

        let renamed = self
            .budget
            .run(
                self.repository
                    .rename(id, server.name(), server.updated_at()),
            )
            .await?;
        info!(kind = %K::TAG, server_id = %id, name = %renamed.name(), "server renamed");
        Ok(renamed)
    }

    /// Sets the server status from its text form.
    ///
    /// Moving a server to `inactive` deactivates every active record that
    /// depends on it before returning. Setting the current status is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Repository`] when the server
    /// does not exist or persistence fails,
    /// [`ServerRegistryServiceError::Status`] when `status` is not
    /// recognised, and [`ServerRegistryServiceError::Cascade`] when dependent
    /// records could not all be deactivated. In the last case the server
    /// itself is already stored as inactive.
    pub async fn set_status(
        &self,
        id: ServerId<K>,
        status: &str,
    ) -> ServerRegistryServiceResult<Server<K>> {
        let mut server = self.find_by_id_or_error(id).await?;
        let target = Status::try_from(status)?;

        if !server.transition_to(target, &*self.clock) {
            debug!(kind = %K::TAG, server_id = %id, %status, "status unchanged");
            return Ok(server);
        }

        let stored = self
            .budget
            .run(
                self.repository
                    .set_status(id, target, server.updated_at()),
            )
            .await?;
        info!(kind = %K::TAG, server_id = %id, status = %target, "server status changed");

        if target == Status::Inactive {
            let report = self.cascade.deactivate_dependents(K::reference(id)).await?;
            info!(
                kind = %K::TAG,
                server_id = %id,
                examined = report.examined,
                deactivated = report.deactivated.len(),
                "dependent records deactivated"
            );
        }

        Ok(stored)
    }

    async fn find_by_id_or_error(&self, id: ServerId<K>) -> ServerRegistryServiceResult<Server<K>> {
        self.budget
            .run(self.repository.find_by_id(id))
            .await?
            .ok_or_else(|| ServerRepositoryError::NotFound(K::reference(id)).into())
    }
}
