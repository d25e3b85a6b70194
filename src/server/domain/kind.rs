//! Server kind markers.

use super::ServerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Runtime tag naming a server kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKindTag {
    /// Servers that render notifications in a webview.
    Webview,
    /// Servers that deliver notifications to users.
    UserDelivery,
}

impl ServerKindTag {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Webview => "webview",
            Self::UserDelivery => "user_delivery",
        }
    }

    /// Returns a human-readable label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Webview => "webview server",
            Self::UserDelivery => "user delivery server",
        }
    }
}

impl fmt::Display for ServerKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile-time marker for a server kind.
pub trait ServerKind:
    fmt::Debug + Clone + Copy + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// Runtime tag for this kind.
    const TAG: ServerKindTag;

    /// Wraps an identifier of this kind into a kind-erased reference.
    fn reference(id: ServerId<Self>) -> ServerRef;
}

/// Marker for webview servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Webview;

/// Marker for user-delivery servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UserDelivery;

impl ServerKind for Webview {
    const TAG: ServerKindTag = ServerKindTag::Webview;

    fn reference(id: ServerId<Self>) -> ServerRef {
        ServerRef::Webview(id)
    }
}

impl ServerKind for UserDelivery {
    const TAG: ServerKindTag = ServerKindTag::UserDelivery;

    fn reference(id: ServerId<Self>) -> ServerRef {
        ServerRef::UserDelivery(id)
    }
}

/// Reference to a server of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerRef {
    /// A webview server.
    Webview(ServerId<Webview>),
    /// A user-delivery server.
    UserDelivery(ServerId<UserDelivery>),
}

impl ServerRef {
    /// Returns the kind of the referenced server.
    #[must_use]
    pub const fn kind(self) -> ServerKindTag {
        match self {
            Self::Webview(_) => ServerKindTag::Webview,
            Self::UserDelivery(_) => ServerKindTag::UserDelivery,
        }
    }

    /// Returns the referenced server's UUID.
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        match self {
            Self::Webview(id) => id.into_inner(),
            Self::UserDelivery(id) => id.into_inner(),
        }
    }
}

impl fmt::Display for ServerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().label(), self.uuid())
    }
}
