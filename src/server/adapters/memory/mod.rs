//! In-memory adapters for server registration.

mod repository;

pub use repository::InMemoryServerRepository;
