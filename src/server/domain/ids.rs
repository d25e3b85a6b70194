//! Identifier type for registered servers.

use super::{ServerDomainError, ServerKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a server of kind `K`.
///
/// The kind parameter only exists at compile time: a webview server id can
/// not be passed where a user-delivery server id is expected.
pub struct ServerId<K> {
    uuid: Uuid,
    kind: PhantomData<fn() -> K>,
}

impl<K> ServerId<K> {
    /// Creates a new random server identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Creates a server identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            kind: PhantomData,
        }
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.uuid
    }
}

impl<K> Default for ServerId<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for ServerId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ServerId<K> {}

impl<K> PartialEq for ServerId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<K> Eq for ServerId<K> {}

impl<K> Hash for ServerId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<K> AsRef<Uuid> for ServerId<K> {
    fn as_ref(&self) -> &Uuid {
        &self.uuid
    }
}

impl<K: ServerKind> fmt::Debug for ServerId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerId<{}>({})", K::TAG, self.uuid)
    }
}

impl<K> fmt::Display for ServerId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

impl<K> FromStr for ServerId<K> {
    type Err = ServerDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self::from_uuid)
            .map_err(|_| ServerDomainError::InvalidId(value.to_owned()))
    }
}

impl<K> Serialize for ServerId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uuid.serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for ServerId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}
