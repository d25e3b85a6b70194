//! Domain model for connections between a webview server and a
//! user-delivery server.
//!
//! A connection owns two API keys generated at creation, an optional
//! webhook, and an activation status that may only become active while both
//! servers are active.

mod api_key;
mod connection;
mod error;
mod ids;
mod webhook;

pub use api_key::{ApiKey, DEFAULT_API_KEY_BYTES, MAX_API_KEY_BYTES};
pub use connection::{Connection, ConnectionPair, NewConnection, PersistedConnectionData};
pub use error::ConnectionDomainError;
pub use ids::ConnectionId;
pub use webhook::WebhookUrl;
