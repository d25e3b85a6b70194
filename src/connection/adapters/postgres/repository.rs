//! `PostgreSQL` repository implementation for connections.

use super::{
    models::{ConnectionRow, NewConnectionRow},
    schema::connections,
};
use crate::connection::{
    domain::{
        ApiKey, Connection, ConnectionId, ConnectionPair, PersistedConnectionData, WebhookUrl,
    },
    ports::{
        ConnectionFilter, ConnectionRepository, ConnectionRepositoryError,
        ConnectionRepositoryResult,
    },
};
use crate::pagination::{Page, PageRequest};
use crate::server::domain::{ServerId, ServerRef};
use crate::status::Status;
use crate::store::PgPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Name of the unique index on the server pair.
const PAIR_INDEX: &str = "idx_connections_pair";

/// `PostgreSQL`-backed connection repository.
#[derive(Debug, Clone)]
pub struct PostgresConnectionRepository {
    pool: PgPool,
}

impl PostgresConnectionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ConnectionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ConnectionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ConnectionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ConnectionRepositoryError::persistence)?
    }
}

#[async_trait]
impl ConnectionRepository for PostgresConnectionRepository {
    async fn insert(&self, connection: &Connection) -> ConnectionRepositoryResult<()> {
        let id = connection.id();
        let pair = connection.pair();
        let new_row = to_new_row(connection);

        self.run_blocking(move |conn| {
            diesel::insert_into(connections::table)
                .values(&new_row)
                .execute(conn)
                .map_err(|err| map_insert_error(err, id, pair))?;
            Ok(())
        })
        .await
    }

    async fn set_webhook_url(
        &self,
        id: ConnectionId,
        url: &WebhookUrl,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        let webhook = url.as_str().to_owned();

        self.run_blocking(move |conn| {
            let row = diesel::update(connections::table.find(id.into_inner()))
                .set((
                    connections::webhook_url.eq(Some(webhook)),
                    connections::updated_at.eq(at),
                ))
                .returning(ConnectionRow::as_returning())
                .get_result::<ConnectionRow>(conn)
                .optional()
                .map_err(ConnectionRepositoryError::persistence)?
                .ok_or(ConnectionRepositoryError::NotFound(id))?;
            row_to_connection(row)
        })
        .await
    }

    async fn set_status(
        &self,
        id: ConnectionId,
        status: Status,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        self.run_blocking(move |conn| {
            let row = diesel::update(connections::table.find(id.into_inner()))
                .set((
                    connections::status.eq(status.as_str()),
                    connections::updated_at.eq(at),
                ))
                .returning(ConnectionRow::as_returning())
                .get_result::<ConnectionRow>(conn)
                .optional()
                .map_err(ConnectionRepositoryError::persistence)?
                .ok_or(ConnectionRepositoryError::NotFound(id))?;
            row_to_connection(row)
        })
        .await
    }

    async fn find_by_id(&self, id: ConnectionId) -> ConnectionRepositoryResult<Option<Connection>> {
        self.run_blocking(move |conn| {
            let row = connections::table
                .find(id.into_inner())
                .select(ConnectionRow::as_select())
                .first::<ConnectionRow>(conn)
                .optional()
                .map_err(ConnectionRepositoryError::persistence)?;
            row.map(row_to_connection).transpose()
        })
        .await
    }

    async fn list(
        &self,
        filter: &ConnectionFilter,
        page: PageRequest,
    ) -> ConnectionRepositoryResult<Page<Connection>> {
        let filter_copy = *filter;
        let limit = i64::from(page.limit());
        let offset =
            i64::try_from(page.offset()).map_err(ConnectionRepositoryError::persistence)?;

        self.run_blocking(move |conn| {
            let total: i64 = filtered(&filter_copy)
                .count()
                .get_result(conn)
                .map_err(ConnectionRepositoryError::persistence)?;
            let rows = filtered(&filter_copy)
                .order((connections::created_at.asc(), connections::id.asc()))
                .limit(limit)
                .offset(offset)
                .select(ConnectionRow::as_select())
                .load::<ConnectionRow>(conn)
                .map_err(ConnectionRepositoryError::persistence)?;

            let items = rows
                .into_iter()
                .map(row_to_connection)
                .collect::<ConnectionRepositoryResult<Vec<_>>>()?;
            let total_count =
                u64::try_from(total).map_err(ConnectionRepositoryError::invalid_persisted_data)?;
            Ok(Page::new(items, page, total_count))
        })
        .await
    }

    async fn find_by_server(&self, server: ServerRef) -> ConnectionRepositoryResult<Vec<Connection>> {
        self.run_blocking(move |conn| {
            let query = connections::table.into_boxed();
            let scoped = match server {
                ServerRef::Webview(id) => {
                    query.filter(connections::webview_server_id.eq(id.into_inner()))
                }
                ServerRef::UserDelivery(id) => {
                    query.filter(connections::user_delivery_server_id.eq(id.into_inner()))
                }
            };
            let rows = scoped
                .order((connections::created_at.asc(), connections::id.asc()))
                .select(ConnectionRow::as_select())
                .load::<ConnectionRow>(conn)
                .map_err(ConnectionRepositoryError::persistence)?;
            rows.into_iter().map(row_to_connection).collect()
        })
        .await
    }

    async fn deactivate_if_active(
        &self,
        id: ConnectionId,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<bool> {
        self.run_blocking(move |conn| {
            let uuid = id.into_inner();
            let updated_count = diesel::update(
                connections::table
                    .filter(connections::id.eq(uuid))
                    .filter(connections::status.eq(Status::Active.as_str())),
            )
            .set((
                connections::status.eq(Status::Inactive.as_str()),
                connections::updated_at.eq(at),
            ))
            .execute(conn)
            .map_err(ConnectionRepositoryError::persistence)?;

            if updated_count > 0 {
                return Ok(true);
            }

            let exists = diesel::select(diesel::dsl::exists(connections::table.find(uuid)))
                .get_result::<bool>(conn)
                .map_err(ConnectionRepositoryError::persistence)?;
            if exists {
                Ok(false)
            } else {
                Err(ConnectionRepositoryError::NotFound(id))
            }
        })
        .await
    }
}

fn filtered(filter: &ConnectionFilter) -> connections::BoxedQuery<'static, Pg> {
    let mut query = connections::table
        .filter(connections::user_delivery_server_id.eq(filter.user_delivery_server_id.into_inner()))
        .into_boxed();
    if let Some(webview_id) = filter.webview_server_id {
        query = query.filter(connections::webview_server_id.eq(webview_id.into_inner()));
    }
    if let Some(status) = filter.status {
        query = query.filter(connections::status.eq(status.as_str()));
    }
    query
}

fn to_new_row(connection: &Connection) -> NewConnectionRow {
    let pair = connection.pair();
    NewConnectionRow {
        id: connection.id().into_inner(),
        webview_server_id: pair.webview.into_inner(),
        user_delivery_server_id: pair.user_delivery.into_inner(),
        webview_server_api_key: connection.webview_server_api_key().as_str().to_owned(),
        user_delivery_server_api_key: connection.user_delivery_server_api_key().as_str().to_owned(),
        webhook_url: connection.webhook_url().map(|url| url.as_str().to_owned()),
        status: connection.status().as_str().to_owned(),
        created_at: connection.created_at(),
        updated_at: connection.updated_at(),
    }
}

fn row_to_connection(row: ConnectionRow) -> ConnectionRepositoryResult<Connection> {
    let ConnectionRow {
        id,
        webview_server_id,
        user_delivery_server_id,
        webview_server_api_key,
        user_delivery_server_api_key,
        webhook_url,
        status,
        created_at,
        updated_at,
    } = row;

    let parsed_webhook = webhook_url
        .as_deref()
        .map(WebhookUrl::parse)
        .transpose()
        .map_err(ConnectionRepositoryError::invalid_persisted_data)?;
    let parsed_status = Status::try_from(status.as_str())
        .map_err(ConnectionRepositoryError::invalid_persisted_data)?;

    Ok(Connection::from_persisted(PersistedConnectionData {
        id: ConnectionId::from_uuid(id),
        pair: ConnectionPair::new(
            ServerId::from_uuid(webview_server_id),
            ServerId::from_uuid(user_delivery_server_id),
        ),
        webview_server_api_key: ApiKey::new(webview_server_api_key),
        user_delivery_server_api_key: ApiKey::new(user_delivery_server_api_key),
        webhook_url: parsed_webhook,
        status: parsed_status,
        created_at,
        updated_at,
    }))
}

fn map_insert_error(
    err: DieselError,
    id: ConnectionId,
    pair: ConnectionPair,
) -> ConnectionRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.constraint_name() == Some(PAIR_INDEX) =>
        {
            ConnectionRepositoryError::DuplicatePair(pair)
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ConnectionRepositoryError::DuplicateConnection(id)
        }
        _ => ConnectionRepositoryError::persistence(err),
    }
}

