use chrono::NaiveDate;
use peppol_billing::core::*;
use peppol_billing::ubl;
use rust_decimal_macros::dec;

fn main() {
    let invoice = InvoiceBuilder::new("INV-2025-003", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
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

    let xml = ubl::to_xml(&invoice).expect("serialization should succeed");
    println!("{xml}");

    let parsed = ubl::from_xml(&xml).expect("own output should parse");
    assert_eq!(parsed, invoice);
    println!("\nRound trip OK: {} lines, payable {} {}",
        parsed.lines.len(),
        parsed.monetary_total.payable_amount.value,
        parsed.currency_code,
    );
}
