//! Step definitions for connection lifecycle scenarios.

mod given;
mod then;
mod when;
pub mod world;
