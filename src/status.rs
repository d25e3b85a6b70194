//! Activation status shared by servers and connections.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Activation status of a registered server or a connection.
///
/// Both states can be entered from the other; there is no implicit expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The entity is not in use. Every entity starts here.
    Inactive,
    /// The entity is in use.
    Active,
}

impl Status {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Returns `true` for [`Status::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Interprets an optional listing filter.
    ///
    /// Only the exact strings `active` and `inactive` select a status; any
    /// other value, including differently cased ones, yields `None` so the
    /// filter is ignored rather than rejected.
    #[must_use]
    pub fn filter(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some("active") => Some(Self::Active),
            Some("inactive") => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Status {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Error returned when a requested or persisted status is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status value: {0:?} (expected \"active\" or \"inactive\")")]
pub struct ParseStatusError(pub String);
