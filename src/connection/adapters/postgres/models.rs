//! Diesel row models for connection persistence.

use super::schema::connections;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for connection records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConnectionRow {
    pub id: Uuid,
    pub webview_server_id: Uuid,
    pub user_delivery_server_id: Uuid,
    pub webview_server_api_key: String,
    pub user_delivery_server_api_key: String,
    pub webhook_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for connection records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnectionRow {
    pub id: Uuid,
    pub webview_server_id: Uuid,
    pub user_delivery_server_id: Uuid,
    pub webview_server_api_key: String,
    pub user_delivery_server_api_key: String,
    pub webhook_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
