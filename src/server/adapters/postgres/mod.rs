//! `PostgreSQL` adapters for server registration persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresServerRepository;
