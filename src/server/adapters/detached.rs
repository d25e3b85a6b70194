//! Cascade hook for registries whose servers have no dependents.

use crate::server::{
    domain::ServerRef,
    ports::{CascadeError, CascadeReport, DeactivationCascade},
};
use async_trait::async_trait;

/// [`DeactivationCascade`] that finds nothing to deactivate.
///
/// Useful for running a server registry on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDependents;

#[async_trait]
impl DeactivationCascade for NoDependents {
    async fn deactivate_dependents(&self, server: ServerRef) -> Result<CascadeReport, CascadeError> {
        Ok(CascadeReport::empty(server))
    }
}
