//! Diesel row models for server persistence.

use super::schema::servers;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for server records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServerRow {
    /// Server identifier.
    pub id: uuid::Uuid,
    /// Server kind.
    pub kind: String,
    /// Server name.
    pub name: String,
    /// Activation status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for server records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = servers)]
pub struct NewServerRow {
    /// Server identifier.
    pub id: uuid::Uuid,
    /// Server kind.
    pub kind: String,
    /// Server name.
    pub name: String,
    /// Activation status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}
