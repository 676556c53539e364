//! Port-bridging adapters between the subsystem crates.

pub mod code_issuer;
pub mod code_provider;
pub mod code_store;
pub mod collaborators;
pub mod contingency;
