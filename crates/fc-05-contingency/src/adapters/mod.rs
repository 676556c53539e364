//! Batch repository adapters.

pub mod memory;
