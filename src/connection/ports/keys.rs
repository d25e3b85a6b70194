//! Port for issuing connection credentials.

use crate::connection::domain::ApiKey;

/// Source of opaque API keys.
#[cfg_attr(test, mockall::automock)]
pub trait ApiKeyGenerator: Send + Sync {
    /// Returns a fresh key built from `byte_length` random bytes.
    ///
    /// Implementations may not fail: a key source that cannot produce
    /// randomness is a process-level fault and panics.
    fn generate(&self, byte_length: usize) -> ApiKey;
}
