use chrono::NaiveDate;
use peppol_billing::core::*;
use peppol_billing::{AcceptError, Pipeline};
use rust_decimal_macros::dec;

fn main() {
    let pipeline = Pipeline::standard();

    let invoice = InvoiceBuilder::new("INV-2025-004", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        .due_date(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        .buyer_reference("PO-4711")
        .supplier(
            PartyBuilder::new(
                "ACME GmbH",
                AddressBuilder::new("Berlin", "10115", "DE").build(),
            )
            .endpoint("9930", "DE123456789")
            .vat_id("DE123456789")
            .build(),
        )
        .customer(
            PartyBuilder::new(
                "Kund AB",
                AddressBuilder::new("Stockholm", "111 22", "SE").build(),
            )
            .endpoint("0007", "5567890123")
            .build(),
        )
        .add_line(
            LineBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .expect("invoice should build");

    // ── 1. Outbound: validate, then serialize ─────────────────────────
    let bytes = pipeline.emit(&invoice).expect("compliant invoice should emit");
    println!("Emitted {} bytes of UBL", bytes.len());

    // ── 2. Inbound: parse, then validate ──────────────────────────────
    let accepted = pipeline.accept(&bytes).expect("own output should be accepted");
    println!(
        "Accepted {} with {} warnings",
        accepted.invoice.id,
        accepted.warnings.len()
    );

    // ── 3. A fatally broken document is refused ───────────────────────
    let mut broken = invoice.clone();
    broken.customer.endpoint = None;
    let bytes = pipeline.serialize(&broken).expect("serialization is rule-blind");

    match pipeline.accept(&bytes) {
        Ok(_) => println!("Accepted (unexpected)"),
        Err(AcceptError::Rejected(violations)) => {
            println!("\nRejected with {} violations:", violations.len());
            for v in &violations {
                println!("  {v}");
            }
        }
        Err(AcceptError::Structural(e)) => println!("Structural defect: {e}"),
    }

    // ── 4. Unreadable input never reaches the rules ───────────────────
    match pipeline.accept(b"<not-an-invoice/>") {
        Ok(_) => println!("Parsed (unexpected)"),
        Err(e) => println!("\nGarbage input: {e}"),
    }
}
