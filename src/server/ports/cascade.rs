//! Port for deactivating records that depend on a server.
//!
//! The server registry calls this hook after a server has been written as
//! inactive. Implementations live with the dependent records, which keeps
//! the server context free of any knowledge about them.

use crate::server::domain::ServerRef;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Outcome of a cascade in which every required write succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Server whose deactivation triggered the cascade.
    pub server: ServerRef,
    /// Number of dependent records inspected, whatever their status.
    pub examined: usize,
    /// Identifiers of records moved from active to inactive.
    pub deactivated: Vec<Uuid>,
}

impl CascadeReport {
    /// Creates a report for a server without dependents.
    #[must_use]
    pub const fn empty(server: ServerRef) -> Self {
        Self {
            server,
            examined: 0,
            deactivated: Vec::new(),
        }
    }
}

/// A dependent record the cascade could not deactivate.
#[derive(Debug, Clone)]
pub struct CascadeFailure {
    /// Identifier of the record left active.
    pub record_id: Uuid,
    /// Last error returned for the record.
    pub error: Arc<dyn std::error::Error + Send + Sync>,
}

/// Cascade failures.
#[derive(Debug, Clone, Error)]
pub enum CascadeError {
    /// Dependents could not be loaded; nothing was written.
    #[error("failed to load records depending on {server}: {source}")]
    Lookup {
        /// Server whose dependents were requested.
        server: ServerRef,
        /// Underlying store error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Some dependents were deactivated, others were not. Completed writes
    /// are kept.
    #[error(
        "cascade for {server} incomplete: {} deactivated, {} failed",
        deactivated.len(),
        failed.len()
    )]
    Partial {
        /// Server whose deactivation triggered the cascade.
        server: ServerRef,
        /// Records successfully deactivated before and after the failures.
        deactivated: Vec<Uuid>,
        /// Records left active.
        failed: Vec<CascadeFailure>,
    },
}

/// Hook invoked when a server transitions to inactive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeactivationCascade: Send + Sync {
    /// Deactivates every active record that references `server`.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Lookup`] when dependents cannot be loaded and
    /// [`CascadeError::Partial`] when at least one write failed.
    async fn deactivate_dependents(&self, server: ServerRef) -> Result<CascadeReport, CascadeError>;
}
