//! Validated server name type.

use super::ServerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a server name, matching the `VARCHAR(255)` column.
const MAX_NAME_LENGTH: usize = 255;

/// Non-empty, trimmed server name.
///
/// Uniqueness within a kind is an exact, case-sensitive comparison of the
/// trimmed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated server name.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::EmptyName`] when the value is empty after
    /// trimming, or [`ServerDomainError::NameTooLong`] when it exceeds 255
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ServerDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ServerDomainError::EmptyName);
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(ServerDomainError::NameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match used by keyword search.
    #[must_use]
    pub fn contains_ignore_case(&self, keyword: &str) -> bool {
        self.0.to_lowercase().contains(&keyword.to_lowercase())
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
