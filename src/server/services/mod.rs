//! Application services for server registration and lifecycle.

mod registry;

pub use registry::{
    ServerListQuery, ServerRegistryService, ServerRegistryServiceError,
    ServerRegistryServiceResult,
};
