//! Notiflink: server pairing registry for notification delivery.
//!
//! This crate registers webview servers and user-delivery servers, pairs
//! them through connections that carry per-pair API credentials and an
//! optional webhook, and keeps connection status consistent with the status
//! of the servers they reference.
//!
//! # Architecture
//!
//! Notiflink follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, randomness)
//!
//! # Modules
//!
//! - [`server`]: Webview and user-delivery server registration and status
//! - [`connection`]: Connection lifecycle, API keys, and cascade deactivation
//! - [`bootstrap`]: Composition root wiring repositories into services

pub mod bootstrap;
pub mod config;
pub mod connection;
pub mod envelope;
pub mod pagination;
pub mod server;
pub mod status;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_support;
