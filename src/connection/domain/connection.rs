//! Connection aggregate root.

use super::{ApiKey, ConnectionId, WebhookUrl};
use crate::server::domain::{ServerId, ServerRef, UserDelivery, Webview};
use crate::status::Status;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two servers a connection pairs. At most one connection exists per
/// pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionPair {
    /// Webview side of the pair.
    pub webview: ServerId<Webview>,
    /// User-delivery side of the pair.
    pub user_delivery: ServerId<UserDelivery>,
}

impl fmt::Display for ConnectionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "webview server {} / user delivery server {}",
            self.webview, self.user_delivery
        )
    }
}

impl ConnectionPair {
    /// Creates a pair.
    #[must_use]
    pub const fn new(webview: ServerId<Webview>, user_delivery: ServerId<UserDelivery>) -> Self {
        Self {
            webview,
            user_delivery,
        }
    }

    /// Returns `true` when `server` is one side of this pair.
    #[must_use]
    pub fn references(&self, server: ServerRef) -> bool {
        match server {
            ServerRef::Webview(id) => self.webview == id,
            ServerRef::UserDelivery(id) => self.user_delivery == id,
        }
    }
}

/// Input for creating a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConnection {
    /// Servers being paired.
    pub pair: ConnectionPair,
    /// Key issued to the webview server.
    pub webview_server_api_key: ApiKey,
    /// Key issued to the user-delivery server.
    pub user_delivery_server_api_key: ApiKey,
    /// Optional callback on the user-delivery server.
    pub webhook_url: Option<WebhookUrl>,
}

/// Parameter object for reconstructing a persisted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedConnectionData {
    /// Persisted connection identifier.
    pub id: ConnectionId,
    /// Persisted server pair.
    pub pair: ConnectionPair,
    /// Persisted webview server key.
    pub webview_server_api_key: ApiKey,
    /// Persisted user-delivery server key.
    pub user_delivery_server_api_key: ApiKey,
    /// Persisted webhook.
    pub webhook_url: Option<WebhookUrl>,
    /// Persisted activation status.
    pub status: Status,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Pairing of one webview server with one user-delivery server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    id: ConnectionId,
    status: Status,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    webview_server_api_key: ApiKey,
    user_delivery_server_api_key: ApiKey,
    webview_server_id: ServerId<Webview>,
    user_delivery_server_id: ServerId<UserDelivery>,
    #[serde(
        rename = "userDeliveryServerWebHookUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    webhook_url: Option<WebhookUrl>,
}

impl Connection {
    /// Creates a new connection with `Inactive` status.
    #[must_use]
    pub fn new(input: NewConnection, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ConnectionId::new(),
            status: Status::Inactive,
            created_at: timestamp,
            updated_at: timestamp,
            webview_server_api_key: input.webview_server_api_key,
            user_delivery_server_api_key: input.user_delivery_server_api_key,
            webview_server_id: input.pair.webview,
            user_delivery_server_id: input.pair.user_delivery,
            webhook_url: input.webhook_url,
        }
    }

    /// Reconstructs a connection from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedConnectionData) -> Self {
        Self {
            id: data.id,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            webview_server_api_key: data.webview_server_api_key,
            user_delivery_server_api_key: data.user_delivery_server_api_key,
            webview_server_id: data.pair.webview,
            user_delivery_server_id: data.pair.user_delivery,
            webhook_url: data.webhook_url,
        }
    }

    /// Returns the connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the paired servers.
    #[must_use]
    pub const fn pair(&self) -> ConnectionPair {
        ConnectionPair::new(self.webview_server_id, self.user_delivery_server_id)
    }

    /// Returns the webview server identifier.
    #[must_use]
    pub const fn webview_server_id(&self) -> ServerId<Webview> {
        self.webview_server_id
    }

    /// Returns the user-delivery server identifier.
    #[must_use]
    pub const fn user_delivery_server_id(&self) -> ServerId<UserDelivery> {
        self.user_delivery_server_id
    }

    /// Returns the key issued to the webview server.
    #[must_use]
    pub const fn webview_server_api_key(&self) -> &ApiKey {
        &self.webview_server_api_key
    }

    /// Returns the key issued to the user-delivery server.
    #[must_use]
    pub const fn user_delivery_server_api_key(&self) -> &ApiKey {
        &self.user_delivery_server_api_key
    }

    /// Returns the webhook, if one is configured.
    #[must_use]
    pub const fn webhook_url(&self) -> Option<&WebhookUrl> {
        self.webhook_url.as_ref()
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

    /// Replaces the webhook.
    ///
    /// Returns `false`, leaving the connection untouched, when `url` equals
    /// the current webhook.
    pub fn update_webhook_url(&mut self, url: WebhookUrl, clock: &impl Clock) -> bool {
        if self.webhook_url.as_ref() == Some(&url) {
            return false;
        }
        self.webhook_url = Some(url);
        self.touch(clock);
        true
    }

    /// Moves the connection to `status`.
    ///
    /// Returns `false`, leaving the connection untouched, when it already
    /// has that status. Server preconditions are checked by the caller.
    pub fn transition_to(&mut self, status: Status, clock: &impl Clock) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.touch(clock);
        true
    }

    /// Moves an active connection to `Inactive`, stamping `at`.
    ///
    /// Used by stores applying a conditional deactivation. Returns `false`
    /// when the connection is not active.
    pub fn deactivate_at(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.is_active() {
            return false;
        }
        self.status = Status::Inactive;
        self.updated_at = at;
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
