//! Port contracts for server registration.
//!
//! Ports define infrastructure-agnostic interfaces used by the server
//! registry service: persistence, and the hook that deactivates records
//! depending on a server.

pub mod cascade;
pub mod repository;

pub use cascade::{CascadeError, CascadeFailure, CascadeReport, DeactivationCascade};
pub use repository::{ServerFilter, ServerRepository, ServerRepositoryError, ServerRepositoryResult};
