//! Core invoice model, builders, and errors.
//!
//! This module provides the foundational types for Peppol BIS Billing 3.0
//! invoices based on the EN 16931 semantic model, plus a builder layer
//! that computes totals and tax breakdowns.

mod builder;
mod error;
mod types;

pub use builder::*;
pub use error::*;
pub use types::*;
