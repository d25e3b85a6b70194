//! Connection lifecycle for Notiflink.
//!
//! A connection pairs one webview server with one user-delivery server and
//! carries the credentials both sides use. This module owns:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`], including the cascade that
//!   deactivates connections when a server is deactivated

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
