//! Adapter implementations for connection ports.

pub mod keys;
pub mod memory;
pub mod postgres;
