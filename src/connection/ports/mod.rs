//! Port definitions for connection persistence and credential generation.

pub mod keys;
pub mod repository;

pub use keys::ApiKeyGenerator;
pub use repository::{
    ConnectionFilter, ConnectionRepository, ConnectionRepositoryError, ConnectionRepositoryResult,
};
