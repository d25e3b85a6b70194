//! Webview and user-delivery server registration for Notiflink.
//!
//! Both server kinds share one generic implementation parameterized by a
//! [`domain::ServerKind`] marker. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
