//! Opaque API credential carried by a connection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes behind each issued key.
pub const DEFAULT_API_KEY_BYTES: usize = 32;

/// Largest key size whose hex encoding fits the 128-character key columns.
pub const MAX_API_KEY_BYTES: usize = 64;

/// Opaque credential issued to one side of a connection.
///
/// The value has no structure beyond its length; it is generated once when
/// the connection is created and never regenerated. `Debug` output is
/// redacted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps an already generated or persisted key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey")
            .field(&format_args!("<{} chars>", self.0.len()))
            .finish()
    }
}
