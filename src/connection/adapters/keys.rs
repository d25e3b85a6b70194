//! Operating-system randomness adapter for API keys.

use crate::connection::{domain::ApiKey, ports::ApiKeyGenerator};
use rand::RngCore;
use rand::rngs::OsRng;

/// Issues keys as lowercase hex over bytes drawn from the operating system
/// RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngKeyGenerator;

impl OsRngKeyGenerator {
    /// Creates the generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ApiKeyGenerator for OsRngKeyGenerator {
    /// # Panics
    ///
    /// Panics when the operating system cannot supply random bytes. No key
    /// can be issued safely in that state.
    fn generate(&self, byte_length: usize) -> ApiKey {
        let mut bytes = vec![0_u8; byte_length];
        if let Err(err) = OsRng.try_fill_bytes(&mut bytes) {
            panic!("operating system randomness unavailable for API key generation: {err}");
        }
        ApiKey::new(hex::encode(bytes))
    }
}
