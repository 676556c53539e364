//! Port definitions for the authorization-code store.

pub mod outbound;
