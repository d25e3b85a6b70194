//! `PostgreSQL` adapters for connection persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresConnectionRepository;
