//! Response envelope and error classification.
//!
//! Every operation result, successful or not, can be rendered as a
//! `{code, message, data}` envelope. Service errors are mapped onto a small
//! set of [`ErrorClass`] values so a transport can pick a status without
//! inspecting individual error variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message carried by every successful envelope.
pub const SUCCESS_MESSAGE: &str = "success";

/// Coarse classification of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed input: unparseable id, empty field, bad URL, bad status.
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// A uniqueness rule would be violated.
    Conflict,
    /// Activation attempted while a dependency is not active.
    Precondition,
    /// The underlying store failed or timed out.
    Store,
}

impl ErrorClass {
    /// Returns the numeric status code placed in the envelope.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Precondition => 412,
            Self::Store => 500,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Precondition => "precondition",
            Self::Store => "store",
        };
        f.write_str(label)
    }
}

/// Errors that can be classified for the response envelope.
pub trait Classify {
    /// Returns the class this error belongs to.
    fn classify(&self) -> ErrorClass;
}

/// `{code, message, data}` response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Status classification code (`200` on success).
    pub code: u16,
    /// Human-readable outcome.
    pub message: String,
    /// Payload; an empty object on failure.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wraps a successful payload.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: SUCCESS_MESSAGE.to_owned(),
            data,
        }
    }
}

impl Envelope<Value> {
    /// Builds a failure envelope from a classified error.
    #[must_use]
    pub fn failure<E>(err: &E) -> Self
    where
        E: Classify + fmt::Display,
    {
        Self {
            code: err.classify().code(),
            message: err.to_string(),
            data: Value::Object(serde_json::Map::new()),
        }
    }

    /// Renders any operation result as an envelope with a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when a successful payload cannot be
    /// serialized.
    pub fn from_result<T, E>(result: Result<T, E>) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
        E: Classify + fmt::Display,
    {
        match result {
            Ok(data) => Ok(Self::success(serde_json::to_value(data)?)),
            Err(err) => Ok(Self::failure(&err)),
        }
    }
}
