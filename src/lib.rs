//! # peppol-billing
//!
//! Validation and serialization engine for Peppol BIS Billing 3.0
//! electronic invoices: the EN 16931 semantic model, a declarative business
//! rule catalog, and a UBL 2.1 codec with an accept/emit pipeline.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Business validation ([`rules`]) and structural (de)serialization
//! ([`ubl`]) are strictly separated: the codec never rejects a document for
//! breaking a business rule, and the rule engine never fails structurally.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use peppol_billing::core::*;
//! use peppol_billing::Pipeline;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("INV-2025-001", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
//!     .due_date(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
//!     .buyer_reference("PO-4711")
//!     .supplier(PartyBuilder::new("ACME GmbH", AddressBuilder::new("Berlin", "10115", "DE").build())
//!         .endpoint("9930", "DE123456789")
//!         .vat_id("DE123456789")
//!         .build())
//!     .customer(PartyBuilder::new("Kunde AB", AddressBuilder::new("Stockholm", "11120", "SE").build())
//!         .endpoint("0007", "5567890123")
//!         .build())
//!     .add_line(LineBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150))
//!         .tax(TaxCategoryCode::StandardRate, dec!(25))
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! let pipeline = Pipeline::standard();
//! assert!(pipeline.validate(&invoice).is_empty());
//!
//! let xml = pipeline.emit(&invoice).unwrap();
//! assert!(String::from_utf8(xml).unwrap().contains("<cbc:PayableAmount"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | (always) | Invoice model, builders, rule catalog, code lists |
//! | `ubl` (default) | UBL 2.1 generation & parsing, accept/emit pipeline |

pub mod codelist;
pub mod core;
pub mod rules;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "ubl")]
mod pipeline;

#[cfg(feature = "ubl")]
pub use crate::pipeline::{AcceptError, Accepted, EmitError, Pipeline};

// Re-export the model at the crate root for convenience
pub use crate::core::*;
