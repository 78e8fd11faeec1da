//! End-to-end orchestration: bytes in, validated model out, and back.
//!
//! [`Pipeline`] composes the codec and the rule engine behind two
//! gatekeeping entry points. [`Pipeline::accept`] takes inbound bytes and
//! refuses documents that are structurally unreadable or violate a fatal
//! business rule; [`Pipeline::emit`] refuses to serialize an invoice that
//! would be rejected on arrival. The lower-level [`Pipeline::parse`],
//! [`Pipeline::validate`] and [`Pipeline::serialize`] remain available for
//! callers that want to look at invalid documents.
//!
//! The pipeline is stateless apart from its code-list resolver and can be
//! shared across threads.

use thiserror::Error;

use crate::codelist::{BuiltinLists, CodeListResolver};
use crate::core::{Invoice, StructuralError};
use crate::rules::{self, Violation};
use crate::ubl;

/// A successfully accepted document: the parsed invoice plus the warnings
/// that did not block acceptance.
#[derive(Debug)]
pub struct Accepted {
    pub invoice: Invoice,
    pub warnings: Vec<Violation>,
}

/// Why [`Pipeline::accept`] refused a document.
///
/// The two variants keep the error taxonomies apart: `Structural` means the
/// bytes never became a model, `Rejected` means the model is readable but
/// breaks fatal business rules.
#[derive(Debug, Error)]
pub enum AcceptError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// At least one fatal violation; the list carries all findings.
    #[error("document rejected with {} rule violation(s)", .0.len())]
    Rejected(Vec<Violation>),
}

/// Why [`Pipeline::emit`] refused to serialize an invoice.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// At least one fatal violation; the list carries all findings.
    #[error("invoice fails validation with {} rule violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}

/// Parse, validate and serialize Peppol BIS Billing 3.0 invoices with a
/// fixed code-list resolver.
pub struct Pipeline<R> {
    resolver: R,
}

impl Pipeline<BuiltinLists> {
    /// A pipeline backed by the bundled standard code lists.
    pub fn standard() -> Self {
        Self::new(BuiltinLists)
    }
}

impl Default for Pipeline<BuiltinLists> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<R: CodeListResolver> Pipeline<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Decode UTF-8 and parse UBL XML. No business rules run here.
    pub fn parse(&self, bytes: &[u8]) -> Result<Invoice, StructuralError> {
        let text = std::str::from_utf8(bytes).map_err(|_| StructuralError::Encoding)?;
        ubl::from_xml(text)
    }

    /// Run the full rule catalog. Never fails; the result lists every
    /// violation in catalog order.
    pub fn validate(&self, invoice: &Invoice) -> Vec<Violation> {
        rules::validate(invoice, &self.resolver)
    }

    /// Serialize without validating.
    pub fn serialize(&self, invoice: &Invoice) -> Result<Vec<u8>, StructuralError> {
        Ok(ubl::to_xml(invoice)?.into_bytes())
    }

    /// Inbound gate: parse, then validate. Structurally unreadable input and
    /// fatal rule violations are refused; warnings ride along with the
    /// accepted invoice.
    pub fn accept(&self, bytes: &[u8]) -> Result<Accepted, AcceptError> {
        let invoice = self.parse(bytes)?;
        let violations = self.validate(&invoice);
        if rules::has_fatal(&violations) {
            return Err(AcceptError::Rejected(violations));
        }
        Ok(Accepted {
            invoice,
            warnings: violations,
        })
    }

    /// Outbound gate: validate, then serialize. An invoice that would be
    /// rejected on arrival is not emitted.
    pub fn emit(&self, invoice: &Invoice) -> Result<Vec<u8>, EmitError> {
        let violations = self.validate(invoice);
        if rules::has_fatal(&violations) {
            return Err(EmitError::Invalid(violations));
        }
        Ok(self.serialize(invoice)?)
    }
}
