use chrono::NaiveDate;
use peppol_billing::codelist::BuiltinLists;
use peppol_billing::core::*;
use peppol_billing::rules;
use rust_decimal_macros::dec;

fn main() {
    let invoice = InvoiceBuilder::new("INV-2025-002", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
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

    // Builder output passes the whole catalog
    let violations = rules::validate(&invoice, &BuiltinLists);
    println!("Compliant invoice: {} violations", violations.len());

    // Break a few things and validate again
    let mut broken = invoice.clone();
    broken.due_date = None;
    broken.monetary_total.payable_amount.value = dec!(9999.99);
    broken.lines[0].quantity.unit_code = "XYZ".into();

    let violations = rules::validate(&broken, &BuiltinLists);
    println!("\nBroken invoice: {} violations", violations.len());
    for v in &violations {
        println!("  {} {}", v.severity, v);
    }
    println!("Exchangeable: {}", !rules::has_fatal(&violations));

    // The catalog itself is data
    println!("\nRule catalog:");
    for group in rules::catalog() {
        println!("  {:<12} {} rules", group.name, group.rules.len());
    }
}
