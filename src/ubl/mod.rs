//! UBL 2.1 Invoice serialization and parsing.
//!
//! Implements the Peppol BIS Billing 3.0 customization of EN 16931 on the
//! OASIS UBL 2.1 Invoice syntax.
//!
//! The serializer emits elements in the fixed order the UBL schema
//! sequences prescribe and never runs business validation; a well-formed
//! model always serializes unless an amount breaks the two-decimal
//! invariant. The parser accepts any serializer output, ignores unknown
//! elements, and reports [`StructuralError`]s for malformed input.
//!
//! # Example
//!
//! ```no_run
//! use peppol_billing::core::Invoice;
//! use peppol_billing::ubl;
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let xml = ubl::to_xml(&invoice).unwrap();
//! let parsed = ubl::from_xml(&xml).unwrap();
//! ```
//!
//! [`StructuralError`]: crate::core::StructuralError

mod de;
mod ser;
pub(crate) mod xml_utils;

pub use de::from_xml;
pub use ser::to_xml;

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
