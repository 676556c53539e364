//! Port definitions for the contingency regularizer.

pub mod outbound;
