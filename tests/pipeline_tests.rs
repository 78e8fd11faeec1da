#![cfg(feature = "ubl")]

use chrono::NaiveDate;
use peppol_billing::codelist::{lists, TableResolver};
use peppol_billing::core::*;
use peppol_billing::rules::Severity;
use peppol_billing::{AcceptError, EmitError, Pipeline};
use rust_decimal_macros::dec;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::new(
        "Nordwind Software GmbH",
        AddressBuilder::new("Berlin", "10115", "DE")
            .street("Torstrasse 1")
            .build(),
    )
    .endpoint("9930", "DE123456789")
    .vat_id("DE123456789")
    .build()
}

fn customer() -> Party {
    PartyBuilder::new(
        "Norrsken Konsult AB",
        AddressBuilder::new("Stockholm", "111 22", "SE").build(),
    )
    .endpoint("0007", "5560360793")
    .vat_id("SE556036079301")
    .build()
}

/// Passes the whole catalog against the builtin lists.
/// Net 1171.00, VAT 292.75, payable 1463.75.
fn compliant() -> Invoice {
    InvoiceBuilder::new("INV-2025-0300", date(2025, 11, 12))
        .due_date(date(2025, 12, 12))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Workstation", dec!(4), "C62", dec!(250.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .add_line(
            LineBuilder::new("2", "Installation", dec!(2), "HUR", dec!(85.50))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap()
}

// ---------- Inbound gate ----------

#[test]
fn accept_round_trips_a_compliant_document() {
    let pipeline = Pipeline::standard();
    let invoice = compliant();

    let bytes = pipeline.serialize(&invoice).unwrap();
    let accepted = pipeline.accept(&bytes).unwrap();

    assert_eq!(accepted.invoice, invoice);
    assert!(
        accepted.warnings.is_empty(),
        "unexpected warnings: {:?}",
        accepted.warnings
    );
}

#[test]
fn accept_rejects_fatal_violations() {
    let pipeline = Pipeline::standard();
    let mut invoice = compliant();
    invoice.customer.endpoint = None;

    let bytes = pipeline.serialize(&invoice).unwrap();
    match pipeline.accept(&bytes).unwrap_err() {
        AcceptError::Rejected(violations) => {
            assert!(
                violations.iter().any(|v| v.rule == "PEPPOL-EN16931-R010"),
                "missing buyer address not reported: {violations:?}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn accept_reports_structural_defects_separately() {
    let pipeline = Pipeline::standard();

    match pipeline.accept(b"<Order/>").unwrap_err() {
        AcceptError::Structural(StructuralError::UnexpectedRoot(name)) => {
            assert_eq!(name, "Order");
        }
        other => panic!("unexpected error: {other}"),
    }

    match pipeline.accept(&[0xff, 0xfe, 0x3c]).unwrap_err() {
        AcceptError::Structural(StructuralError::Encoding) => {}
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn warnings_flow_through_acceptance() {
    // Only ISO 4217 is configured; every other coded field degrades to
    // a warning instead of blocking the document.
    let pipeline = Pipeline::new(TableResolver::new().with_list(lists::ISO_4217, ["EUR"]));
    let invoice = compliant();

    let bytes = pipeline.serialize(&invoice).unwrap();
    let accepted = pipeline.accept(&bytes).unwrap();

    assert_eq!(accepted.invoice, invoice);
    assert!(!accepted.warnings.is_empty());
    assert!(accepted
        .warnings
        .iter()
        .all(|w| w.severity == Severity::Warning));
}

// ---------- Outbound gate ----------

#[test]
fn emit_refuses_invalid_invoices() {
    let pipeline = Pipeline::standard();
    let mut invoice = compliant();
    invoice.lines[1].id = "1".to_string();

    match pipeline.emit(&invoice).unwrap_err() {
        EmitError::Invalid(violations) => {
            assert!(
                violations.iter().any(|v| v.rule == "BR-CO-04"),
                "duplicate line id not reported: {violations:?}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn emit_produces_parseable_bytes() {
    let pipeline = Pipeline::standard();
    let invoice = compliant();

    let bytes = pipeline.emit(&invoice).unwrap();
    assert_eq!(pipeline.parse(&bytes).unwrap(), invoice);
}

#[test]
fn emit_surfaces_serialization_defects() {
    // Two thousandths sit inside the arithmetic tolerance, so the rules
    // pass; the serializer still refuses the three-digit scale.
    let pipeline = Pipeline::standard();
    let mut invoice = compliant();
    invoice.monetary_total.payable_amount.value = dec!(1463.752);

    match pipeline.emit(&invoice).unwrap_err() {
        EmitError::Structural(StructuralError::AmountScale { path, .. }) => {
            assert_eq!(path, "Invoice.LegalMonetaryTotal.PayableAmount");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ---------- Taxonomy split ----------

#[test]
fn rule_violations_do_not_block_bare_serialization() {
    // serialize() stays rule-blind; only emit() runs the catalog.
    let pipeline = Pipeline::standard();
    let mut invoice = compliant();
    invoice.monetary_total.payable_amount.value = dec!(999.99);

    assert!(pipeline.serialize(&invoice).is_ok());
    assert!(matches!(
        pipeline.emit(&invoice),
        Err(EmitError::Invalid(_))
    ));
}

// ---------- Statelessness ----------

#[test]
fn pipeline_calls_are_independent() {
    let pipeline = Pipeline::standard();
    let good = pipeline.serialize(&compliant()).unwrap();

    let first = pipeline.accept(&good).unwrap();
    // A rejected document in between must not leak into later calls.
    assert!(pipeline.accept(b"<Order/>").is_err());
    let second = pipeline.accept(&good).unwrap();

    assert_eq!(first.invoice, second.invoice);
    assert_eq!(first.warnings, second.warnings);
}
