//! Application services for connection lifecycle and cascade deactivation.

mod cascade;
mod manager;

pub use cascade::{CascadeCoordinator, DEFAULT_CASCADE_ATTEMPTS};
pub use manager::{
    ConnectionListQuery, ConnectionManager, ConnectionServiceError, ConnectionServiceResult,
    ConnectionView, CreateConnectionRequest,
};
