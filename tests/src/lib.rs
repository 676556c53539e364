//! # Fiscal-Core Test Suite
//!
//! Cross-subsystem integration scenarios exercised through the wired
//! [`fiscal_runtime::FiscalCore`] facade with a scripted gateway double.
//! Per-crate behavior is covered by the unit modules inside each crate;
//! this crate covers the flows that only exist once everything is wired:
//! emission end-to-end, contingency capture and regularization, deadline
//! expiry, and the issuance serialization property.

#[cfg(test)]
mod integration;
