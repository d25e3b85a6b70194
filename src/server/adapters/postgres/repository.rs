//! `PostgreSQL` repository implementation for server registration.

use super::{
    models::{NewServerRow, ServerRow},
    schema::servers,
};
use crate::pagination::{Page, PageRequest};
use crate::server::{
    domain::{PersistedServerData, Server, ServerId, ServerKind, ServerName, ServerRef},
    ports::{ServerFilter, ServerRepository, ServerRepositoryError, ServerRepositoryResult},
};
use crate::status::Status;
use crate::store::PgPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::marker::PhantomData;

/// Name of the unique index on `(kind, name)`.
const NAME_INDEX: &str = "idx_servers_kind_name";

/// `PostgreSQL`-backed server repository for one server kind.
///
/// Both kinds share the `servers` table and are told apart by the `kind`
/// column; every query is scoped to `K`.
#[derive(Debug, Clone)]
pub struct PostgresServerRepository<K: ServerKind> {
    pool: PgPool,
    kind: PhantomData<fn() -> K>,
}

impl<K: ServerKind> PostgresServerRepository<K> {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ServerRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ServerRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ServerRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ServerRepositoryError::persistence)?
    }
}

#[async_trait]
impl<K: ServerKind> ServerRepository<K> for PostgresServerRepository<K> {
    async fn insert(&self, server: &Server<K>) -> ServerRepositoryResult<()> {
        let server_ref = K::reference(server.id());
        let name = server.name().clone();
        let new_row = to_new_row(server);

        self.run_blocking(move |connection| {
            diesel::insert_into(servers::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_write_error::<K>(err, server_ref, &name))?;
            Ok(())
        })
        .await
    }

    async fn rename(
        &self,
        id: ServerId<K>,
        name: &ServerName,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        let server_ref = K::reference(id);
        let new_name = name.clone();

        self.run_blocking(move |connection| {
            let row = diesel::update(scoped::<K>(id))
                .set((
                    servers::name.eq(new_name.as_str()),
                    servers::updated_at.eq(at),
                ))
                .returning(ServerRow::as_returning())
                .get_result::<ServerRow>(connection)
                .optional()
                .map_err(|err| map_write_error::<K>(err, server_ref, &new_name))?
                .ok_or(ServerRepositoryError::NotFound(server_ref))?;
            row_to_server::<K>(row)
        })
        .await
    }

    async fn set_status(
        &self,
        id: ServerId<K>,
        status: Status,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        let server_ref = K::reference(id);

        self.run_blocking(move |connection| {
            let row = diesel::update(scoped::<K>(id))
                .set((
                    servers::status.eq(status.as_str()),
                    servers::updated_at.eq(at),
                ))
                .returning(ServerRow::as_returning())
                .get_result::<ServerRow>(connection)
                .optional()
                .map_err(ServerRepositoryError::persistence)?
                .ok_or(ServerRepositoryError::NotFound(server_ref))?;
            row_to_server::<K>(row)
        })
        .await
    }

    async fn find_by_id(&self, id: ServerId<K>) -> ServerRepositoryResult<Option<Server<K>>> {
        self.run_blocking(move |connection| {
            let row = scoped::<K>(id)
                .select(ServerRow::as_select())
                .first::<ServerRow>(connection)
                .optional()
                .map_err(ServerRepositoryError::persistence)?;
            row.map(row_to_server::<K>).transpose()
        })
        .await
    }

    async fn list(
        &self,
        filter: &ServerFilter,
        page: PageRequest,
    ) -> ServerRepositoryResult<Page<Server<K>>> {
        let pattern = filter.keyword.as_deref().map(contains_pattern);
        let status = filter.status.map(Status::as_str);
        let limit = i64::from(page.limit());
        let offset = i64::try_from(page.offset()).map_err(ServerRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            let total: i64 = filtered::<K>(pattern.as_deref(), status)
                .count()
                .get_result(connection)
                .map_err(ServerRepositoryError::persistence)?;
            let rows = filtered::<K>(pattern.as_deref(), status)
                .order((servers::created_at.asc(), servers::id.asc()))
                .limit(limit)
                .offset(offset)
                .select(ServerRow::as_select())
                .load::<ServerRow>(connection)
                .map_err(ServerRepositoryError::persistence)?;

            let items = rows
                .into_iter()
                .map(row_to_server::<K>)
                .collect::<ServerRepositoryResult<Vec<_>>>()?;
            let total_count =
                u64::try_from(total).map_err(ServerRepositoryError::invalid_persisted_data)?;
            Ok(Page::new(items, page, total_count))
        })
        .await
    }
}

/// Row of kind `K` with the given identifier.
fn scoped<K: ServerKind>(
    id: ServerId<K>,
) -> diesel::dsl::Filter<
    diesel::dsl::Filter<servers::table, diesel::dsl::Eq<servers::id, uuid::Uuid>>,
    diesel::dsl::Eq<servers::kind, &'static str>,
> {
    servers::table
        .filter(servers::id.eq(id.into_inner()))
        .filter(servers::kind.eq(K::TAG.as_str()))
}

fn filtered<'a, K: ServerKind>(
    pattern: Option<&'a str>,
    status: Option<&'a str>,
) -> servers::BoxedQuery<'a, Pg> {
    let mut query = servers::table
        .filter(servers::kind.eq(K::TAG.as_str()))
        .into_boxed();
    if let Some(name_pattern) = pattern {
        query = query.filter(servers::name.ilike(name_pattern));
    }
    if let Some(status_val) = status {
        query = query.filter(servers::status.eq(status_val));
    }
    query
}

/// Builds an `ILIKE` pattern matching `keyword` anywhere, with wildcards in
/// the keyword itself escaped.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn to_new_row<K: ServerKind>(server: &Server<K>) -> NewServerRow {
    NewServerRow {
        id: server.id().into_inner(),
        kind: K::TAG.as_str().to_owned(),
        name: server.name().as_str().to_owned(),
        status: server.status().as_str().to_owned(),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    }
}

fn row_to_server<K: ServerKind>(row: ServerRow) -> ServerRepositoryResult<Server<K>> {
    let ServerRow {
        id,
        kind,
        name,
        status,
        created_at,
        updated_at,
    } = row;

    if kind != K::TAG.as_str() {
        return Err(ServerRepositoryError::invalid_persisted_data(
            std::io::Error::other(format!("server {id} has kind '{kind}', expected '{}'", K::TAG)),
        ));
    }

    let parsed_name = ServerName::new(name).map_err(ServerRepositoryError::invalid_persisted_data)?;
    let parsed_status =
        Status::try_from(status.as_str()).map_err(ServerRepositoryError::invalid_persisted_data)?;

    Ok(Server::from_persisted(PersistedServerData {
        id: ServerId::from_uuid(id),
        name: parsed_name,
        status: parsed_status,
        created_at,
        updated_at,
    }))
}

fn map_write_error<K: ServerKind>(
    err: DieselError,
    server_ref: ServerRef,
    name: &ServerName,
) -> ServerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_name_unique_violation(info.as_ref()) =>
        {
            ServerRepositoryError::DuplicateName {
                kind: K::TAG,
                name: name.clone(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ServerRepositoryError::DuplicateServer(server_ref)
        }
        _ => ServerRepositoryError::persistence(err),
    }
}

fn is_name_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name().is_some_and(|name| name == NAME_INDEX)
}
