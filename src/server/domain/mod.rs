//! Domain model for server registration.
//!
//! Servers carry a unique name and an activation status. The kind marker
//! keeps webview and user-delivery identifiers apart at compile time while
//! a single implementation serves both.

mod error;
mod ids;
mod kind;
mod name;
mod server;

pub use error::ServerDomainError;
pub use ids::ServerId;
pub use kind::{ServerKind, ServerKindTag, ServerRef, UserDelivery, Webview};
pub use name::ServerName;
pub use server::{PersistedServerData, Server, ServerSummary};
