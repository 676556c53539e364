//! Port definitions for the invoice lifecycle.

pub mod inbound;
pub mod outbound;
