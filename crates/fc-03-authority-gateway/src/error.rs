//! Gateway result alias.
//!
//! The fault taxonomy itself lives in `shared-types` because downstream
//! subsystems branch on it; this crate only produces it.

use shared_types::GatewayFault;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayFault>;
