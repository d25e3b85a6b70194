//! Unit tests for the connection module.
