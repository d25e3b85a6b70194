//! Validated webhook URL for user-delivery callbacks.

use super::ConnectionDomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// Absolute URL with a host, stored in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebhookUrl(Url);

impl WebhookUrl {
    /// Parses a webhook URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionDomainError::InvalidWebhookUrl`] when the value
    /// is not an absolute URL or has no host.
    pub fn parse(raw: &str) -> Result<Self, ConnectionDomainError> {
        let invalid = |reason: String| ConnectionDomainError::InvalidWebhookUrl {
            url: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
        if !url.has_host() {
            return Err(invalid("URL has no host".to_owned()));
        }
        Ok(Self(url))
    }

    /// Parses an optional webhook, treating a blank value as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionDomainError::InvalidWebhookUrl`] when a non-blank
    /// value is not a valid webhook URL.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, ConnectionDomainError> {
        raw.filter(|value| !value.trim().is_empty())
            .map(Self::parse)
            .transpose()
    }

    /// Returns the normalized URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WebhookUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WebhookUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
