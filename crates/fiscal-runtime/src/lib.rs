//! # fiscal-runtime
//!
//! Composition root for the fiscal e-invoicing subsystem.
//!
//! Builds and wires the subsystems (code store 02, gateway 03, lifecycle
//! controller 04, regularizer 05) and exposes the
//! [`FiscalCore`] facade, the only surface the surrounding billing
//! application calls:
//!
//! ```rust,ignore
//! use fiscal_runtime::{FiscalCore, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_env();
//! config.validate_for_production()?;
//! let core = FiscalCore::from_env(config)?;
//! let _regularizer = core.spawn_regularizer();
//!
//! let invoice = core.emit_invoice(transaction).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod wiring;

pub use config::{ConfigError, RuntimeConfig};
pub use wiring::FiscalCore;

// Telemetry bootstrap, re-exported so embedders initialize logging from
// the same crate they wire the core with.
pub use fiscal_telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
