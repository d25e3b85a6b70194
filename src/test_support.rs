//! Shared helpers for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::future::pending;
use std::sync::Mutex;

use crate::connection::{
    domain::{Connection, ConnectionId, WebhookUrl},
    ports::{ConnectionFilter, ConnectionRepository, ConnectionRepositoryResult},
};
use crate::pagination::{Page, PageRequest};
use crate::server::{
    domain::{Server, ServerId, ServerKind, ServerName, ServerRef},
    ports::{ServerFilter, ServerRepository, ServerRepositoryResult},
};
use crate::status::Status;

/// Clock that advances one second every time it is read, so successive
/// mutations always carry distinct timestamps.
#[derive(Debug)]
pub(crate) struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(crate) fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start instant");
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

/// Store that accepts every call and never answers.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StalledStore;

#[async_trait]
impl<K: ServerKind> ServerRepository<K> for StalledStore {
    async fn insert(&self, _server: &Server<K>) -> ServerRepositoryResult<()> {
        pending().await
    }

    async fn rename(
        &self,
        _id: ServerId<K>,
        _name: &ServerName,
        _at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        pending().await
    }

    async fn set_status(
        &self,
        _id: ServerId<K>,
        _status: Status,
        _at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        pending().await
    }

    async fn find_by_id(&self, _id: ServerId<K>) -> ServerRepositoryResult<Option<Server<K>>> {
        pending().await
    }

    async fn list(
        &self,
        _filter: &ServerFilter,
        _page: PageRequest,
    ) -> ServerRepositoryResult<Page<Server<K>>> {
        pending().await
    }
}

#[async_trait]
impl ConnectionRepository for StalledStore {
    async fn insert(&self, _connection: &Connection) -> ConnectionRepositoryResult<()> {
        pending().await
    }

    async fn set_webhook_url(
        &self,
        _id: ConnectionId,
        _url: &WebhookUrl,
        _at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        pending().await
    }

    async fn set_status(
        &self,
        _id: ConnectionId,
        _status: Status,
        _at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        pending().await
    }

    async fn find_by_id(
        &self,
        _id: ConnectionId,
    ) -> ConnectionRepositoryResult<Option<Connection>> {
        pending().await
    }

    async fn list(
        &self,
        _filter: &ConnectionFilter,
        _page: PageRequest,
    ) -> ConnectionRepositoryResult<Page<Connection>> {
        pending().await
    }

    async fn find_by_server(
        &self,
        _server: ServerRef,
    ) -> ConnectionRepositoryResult<Vec<Connection>> {
        pending().await
    }

    async fn deactivate_if_active(
        &self,
        _id: ConnectionId,
        _at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<bool> {
        pending().await
    }
}
