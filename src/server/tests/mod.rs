//! Unit tests for the server registration module.
