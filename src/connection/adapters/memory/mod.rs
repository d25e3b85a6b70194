//! In-memory adapters for connections.

mod repository;

pub use repository::InMemoryConnectionRepository;
