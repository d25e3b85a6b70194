//! Server registration aggregate root.

use super::{ServerId, ServerKind, ServerName};
use crate::status::Status;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Registered server of kind `K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct Server<K: ServerKind> {
    id: ServerId<K>,
    name: ServerName,
    status: Status,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedServerData<K: ServerKind> {
    /// Persisted server identifier.
    pub id: ServerId<K>,
    /// Persisted server name.
    pub name: ServerName,
    /// Persisted activation status.
    pub status: Status,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Lightweight `{id, name}` projection of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ServerSummary<K: ServerKind> {
    /// Server identifier.
    pub id: ServerId<K>,
    /// Server name.
    pub name: ServerName,
}

impl<K: ServerKind> Server<K> {
    /// Creates a new server with `Inactive` status.
    #[must_use]
    pub fn new(name: ServerName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ServerId::new(),
            name,
            status: Status::Inactive,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a server from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedServerData<K>) -> Self {
        Self {
            id: data.id,
            name: data.name,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId<K> {
        self.id
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the activation status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the `{id, name}` projection.
    #[must_use]
    pub fn summary(&self) -> ServerSummary<K> {
        ServerSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Renames the server.
    ///
    /// Returns `false`, leaving the server untouched, when `name` equals the
    /// current name.
    pub fn rename(&mut self, name: ServerName, clock: &impl Clock) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name;
        self.touch(clock);
        true
    }

    /// Moves the server to `status`.
    ///
    /// Returns `false`, leaving the server untouched, when it already has
    /// that status.
    pub fn transition_to(&mut self, status: Status, clock: &impl Clock) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.touch(clock);
        true
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
