use chrono::NaiveDate;
use peppol_billing::core::*;
use rust_decimal_macros::dec;

fn main() {
    // Cross-border invoice from a German supplier to a Swedish buyer
    let invoice = InvoiceBuilder::new("INV-2025-001", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        .due_date(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        .buyer_reference("PO-4711")
        .supplier(
            PartyBuilder::new(
                "ACME GmbH",
                AddressBuilder::new("Berlin", "10115", "DE")
                    .street("Friedrichstraße 123")
                    .build(),
            )
            .endpoint("9930", "DE123456789")
            .vat_id("DE123456789")
            .contact(
                Some("Max Mustermann".into()),
                Some("+49 30 12345".into()),
                Some("max@acme.de".into()),
            )
            .build(),
        )
        .customer(
            PartyBuilder::new(
                "Kund AB",
                AddressBuilder::new("Stockholm", "111 22", "SE")
                    .street("Sveavägen 10")
                    .build(),
            )
            .endpoint("0007", "5567890123")
            .build(),
        )
        .add_line(
            LineBuilder::new("1", "Software development", dec!(80), "HUR", dec!(120.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .description("React frontend work")
                .build(),
        )
        .add_line(
            LineBuilder::new("2", "Hosting (monthly)", dec!(1), "C62", dec!(49.90))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .add_payment_means(PaymentMeans {
            code: PaymentMeansCode::SepaCreditTransfer,
            name: Some("SEPA credit transfer".into()),
            payment_id: Some("INV-2025-001".into()),
            card_account: None,
            payee_account: Some(PayeeAccount {
                id: "DE89370400440532013000".into(),
                name: Some("ACME GmbH".into()),
                institution_branch_id: Some("COBADEFFXXX".into()),
            }),
            mandate: None,
        })
        .payment_terms("Payable within 30 days net")
        .build()
        .expect("invoice should build");

    println!("Invoice:  {}", invoice.id);
    println!("Date:     {}", invoice.issue_date);
    println!("Supplier: {}", invoice.supplier.name);
    println!("Customer: {}", invoice.customer.name);
    println!("---");
    for line in &invoice.lines {
        println!(
            "  {} x {} {} @ {} = {}",
            line.quantity.value,
            line.quantity.unit_code,
            line.item.name,
            line.price.amount.value,
            line.line_extension_amount.value
        );
    }
    println!("---");
    let totals = &invoice.monetary_total;
    println!("Net:     {} {}", totals.tax_exclusive_amount.value, invoice.currency_code);
    println!("VAT:     {} {}", invoice.tax_totals[0].tax_amount.value, invoice.currency_code);
    println!("Gross:   {} {}", totals.tax_inclusive_amount.value, invoice.currency_code);
    println!("Due:     {} {}", totals.payable_amount.value, invoice.currency_code);
}
