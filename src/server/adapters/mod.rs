//! Adapter implementations for server registration ports.

pub mod memory;
pub mod postgres;

mod detached;

pub use detached::NoDependents;
