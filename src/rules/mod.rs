//! EN 16931 / Peppol BIS Billing 3.0 business rule engine.
//!
//! Rules are declarative entries in a static catalog, grouped by class:
//! conditional mandatoriness, arithmetic identities, code-list membership,
//! and structural consistency. [`validate`] runs the whole catalog against
//! a populated [`Invoice`] and returns every violation found; rules never
//! short-circuit each other, so one broken total does not hide the next.
//!
//! Violations are ordered deterministically: catalog group order, then
//! rule-definition order within the group, then first-occurrence order
//! within the document. Each violation carries the stable rule identifier
//! (`BR-CO-10`, `PEPPOL-EN16931-R003`, ...), a severity, the path of the
//! offending field, and a message.
//!
//! Code-bearing fields are checked through a [`CodeListResolver`]. A code
//! the resolver cannot verify is reported as a warning, never as a fatal
//! violation, so an incomplete list configuration cannot reject a valid
//! document.

mod arithmetic;
mod codes;
mod consistency;
mod mandatory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codelist::CodeListResolver;
use crate::core::{AllowanceCharge, Invoice};

/// How severe a rule violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document is degraded but exchangeable.
    Warning,
    /// The document must not be exchanged.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single business rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable rule identifier (e.g. "BR-CO-10").
    pub rule: String,
    /// Severity the violation carries.
    pub severity: Severity,
    /// Dot-separated path to the offending field
    /// (e.g. "Invoice.InvoiceLine[2].ID").
    pub path: String,
    /// Human-readable description of what is wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule, self.path, self.message)
    }
}

/// Check function of a single rule.
///
/// Receives the document and the resolver, reports findings through the
/// sink. Must be pure: no side effects, no panics, inspect-only access.
type Check = fn(&Invoice, &dyn CodeListResolver, &mut Violations);

/// One catalog entry: stable identity, severity, and check function.
pub struct RuleDef {
    /// Stable rule identifier.
    pub id: &'static str,
    /// Severity a violation of this rule carries.
    pub severity: Severity,
    /// One-line summary of what the rule requires.
    pub description: &'static str,
    check: Check,
}

/// A named, ordered group of rules.
pub struct RuleGroup {
    /// Group name (evaluation stage).
    pub name: &'static str,
    /// Rules in definition order.
    pub rules: &'static [RuleDef],
}

static CATALOG: [RuleGroup; 4] = [
    RuleGroup {
        name: "mandatory",
        rules: mandatory::RULES,
    },
    RuleGroup {
        name: "arithmetic",
        rules: arithmetic::RULES,
    },
    RuleGroup {
        name: "codes",
        rules: codes::RULES,
    },
    RuleGroup {
        name: "consistency",
        rules: consistency::RULES,
    },
];

/// The full rule catalog in evaluation order.
pub fn catalog() -> &'static [RuleGroup] {
    &CATALOG
}

/// Sink through which a rule reports its findings.
///
/// [`report`](Self::report) records a violation at the rule's catalog
/// severity; [`advisory`](Self::advisory) forces [`Severity::Warning`],
/// used when a code list is not configured and the check cannot decide.
pub struct Violations<'a> {
    rule: &'static RuleDef,
    out: &'a mut Vec<Violation>,
}

impl Violations<'_> {
    /// Record a violation at the rule's catalog severity.
    pub fn report(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(self.rule.severity, path.into(), message.into());
    }

    /// Record a violation downgraded to a warning.
    pub fn advisory(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, path.into(), message.into());
    }

    fn push(&mut self, severity: Severity, path: String, message: String) {
        self.out.push(Violation {
            rule: self.rule.id.to_string(),
            severity,
            path,
            message,
        });
    }
}

/// Validate an invoice against the full rule catalog.
///
/// Runs every rule (no short-circuiting) and returns the violations in
/// deterministic order: group, then rule definition, then occurrence.
/// An empty result means the document is compliant as far as the
/// configured code lists can tell.
pub fn validate(invoice: &Invoice, resolver: &dyn CodeListResolver) -> Vec<Violation> {
    let mut out = Vec::new();
    for group in &CATALOG {
        for rule in group.rules {
            let mut sink = Violations {
                rule,
                out: &mut out,
            };
            (rule.check)(invoice, resolver, &mut sink);
        }
    }
    out
}

/// Whether any violation in the list is fatal.
pub fn has_fatal(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Fatal)
}

/// Absent or empty optional text. An empty string never satisfies a
/// presence requirement.
fn text_absent(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Document-level and line-level allowances/charges with their paths,
/// in occurrence order.
fn allowance_charges(invoice: &Invoice) -> impl Iterator<Item = (String, &AllowanceCharge)> {
    let document = invoice
        .allowance_charges
        .iter()
        .enumerate()
        .map(|(i, ac)| (format!("Invoice.AllowanceCharge[{i}]"), ac));
    let lines = invoice.lines.iter().enumerate().flat_map(|(i, line)| {
        line.allowance_charges
            .iter()
            .enumerate()
            .map(move |(j, ac)| (format!("Invoice.InvoiceLine[{i}].AllowanceCharge[{j}]"), ac))
    });
    document.chain(lines)
}

/// Fully compliant two-line invoice used as the baseline by the rule tests.
#[cfg(test)]
pub(crate) fn test_invoice() -> Invoice {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::core::{AddressBuilder, InvoiceBuilder, LineBuilder, PartyBuilder, TaxCategoryCode};

    InvoiceBuilder::new("INV-2025-0042", NaiveDate::from_ymd_opt(2025, 11, 3).unwrap())
        .due_date(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap())
        .buyer_reference("COST-CENTRE-42")
        .supplier(
            PartyBuilder::new(
                "Nordwind Software GmbH",
                AddressBuilder::new("Berlin", "10115", "DE")
                    .street("Torstrasse 1")
                    .build(),
            )
            .endpoint("9930", "DE123456789")
            .vat_id("DE123456789")
            .build(),
        )
        .customer(
            PartyBuilder::new(
                "Van den Berg Logistiek B.V.",
                AddressBuilder::new("Utrecht", "3511 AB", "NL")
                    .street("Domplein 2")
                    .build(),
            )
            .endpoint("9944", "NL999999999B01")
            .vat_id("NL999999999B01")
            .build(),
        )
        .add_line(
            LineBuilder::new("1", "Standing desk", dec!(10), "C62", dec!(150.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .add_line(
            LineBuilder::new("2", "Cable tray", dec!(2), "C62", dec!(22.50))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap()
}
