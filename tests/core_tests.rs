use chrono::NaiveDate;
use peppol_billing::core::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
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
        "Van den Berg Logistiek B.V.",
        AddressBuilder::new("Utrecht", "3511 AB", "NL")
            .street("Domplein 2")
            .build(),
    )
    .endpoint("9944", "NL999999999B01")
    .vat_id("NL999999999B01")
    .build()
}

fn two_line_invoice() -> Invoice {
    InvoiceBuilder::new("INV-2025-0100", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
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

// ---------------------------------------------------------------------------
// Totals computation
// ---------------------------------------------------------------------------

#[test]
fn builder_computes_monetary_totals() {
    let invoice = two_line_invoice();
    let totals = &invoice.monetary_total;
    assert_eq!(totals.line_extension_amount.value, dec!(1545.00));
    assert_eq!(totals.tax_exclusive_amount.value, dec!(1545.00));
    assert_eq!(totals.tax_inclusive_amount.value, dec!(1931.25));
    assert_eq!(totals.payable_amount.value, dec!(1931.25));
    assert!(totals.allowance_total_amount.is_none());
    assert!(totals.charge_total_amount.is_none());
    assert!(totals.prepaid_amount.is_none());
    assert!(totals.payable_rounding_amount.is_none());
}

#[test]
fn builder_computes_vat_breakdown() {
    let invoice = two_line_invoice();
    assert_eq!(invoice.tax_totals.len(), 1);
    let total = &invoice.tax_totals[0];
    assert_eq!(total.tax_amount.value, dec!(386.25));
    assert_eq!(total.subtotals.len(), 1);
    let sub = &total.subtotals[0];
    assert_eq!(sub.taxable_amount.value, dec!(1545.00));
    assert_eq!(sub.tax_amount.value, dec!(386.25));
    assert_eq!(sub.category.code, TaxCategoryCode::StandardRate);
    assert_eq!(sub.category.percent, Some(dec!(25)));
}

#[test]
fn builder_groups_vat_by_category_and_rate() {
    let invoice = InvoiceBuilder::new("INV-2025-0101", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Licence", dec!(10), "C62", dec!(100.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .add_line(
            LineBuilder::new("2", "Handbook", dec!(4), "C62", dec!(50.00))
                .tax(TaxCategoryCode::StandardRate, dec!(12))
                .build(),
        )
        .build()
        .unwrap();

    let subs = &invoice.tax_totals[0].subtotals;
    assert_eq!(subs.len(), 2);
    // Breakdown is sorted by category code, then rate.
    assert_eq!(subs[0].category.percent, Some(dec!(12)));
    assert_eq!(subs[0].taxable_amount.value, dec!(200.00));
    assert_eq!(subs[0].tax_amount.value, dec!(24.00));
    assert_eq!(subs[1].category.percent, Some(dec!(25)));
    assert_eq!(subs[1].taxable_amount.value, dec!(1000.00));
    assert_eq!(subs[1].tax_amount.value, dec!(250.00));
    assert_eq!(invoice.tax_totals[0].tax_amount.value, dec!(274.00));
    assert_eq!(
        invoice.monetary_total.tax_inclusive_amount.value,
        dec!(1474.00)
    );
}

#[test]
fn document_allowances_and_charges_fold_into_totals() {
    let invoice = InvoiceBuilder::new("INV-2025-0102", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Server rack", dec!(1), "C62", dec!(1000.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .add_allowance(AllowanceCharge {
            charge_indicator: false,
            reason_code: Some("95".into()),
            reason: Some("Loyalty rebate".into()),
            multiplier_factor: None,
            amount: MonetaryAmount::new(dec!(100.00), "EUR"),
            base_amount: None,
            tax_category: Some(TaxCategory {
                code: TaxCategoryCode::StandardRate,
                percent: Some(dec!(25)),
            }),
        })
        .add_charge(AllowanceCharge {
            charge_indicator: true,
            reason_code: Some("FC".into()),
            reason: Some("Freight".into()),
            multiplier_factor: None,
            amount: MonetaryAmount::new(dec!(30.00), "EUR"),
            base_amount: None,
            tax_category: Some(TaxCategory {
                code: TaxCategoryCode::StandardRate,
                percent: Some(dec!(25)),
            }),
        })
        .build()
        .unwrap();

    let totals = &invoice.monetary_total;
    assert_eq!(
        totals.allowance_total_amount.as_ref().unwrap().value,
        dec!(100.00)
    );
    assert_eq!(
        totals.charge_total_amount.as_ref().unwrap().value,
        dec!(30.00)
    );
    assert_eq!(totals.tax_exclusive_amount.value, dec!(930.00));
    // The taxable base of the S-25 breakdown includes both adjustments.
    assert_eq!(
        invoice.tax_totals[0].subtotals[0].taxable_amount.value,
        dec!(930.00)
    );
    assert_eq!(invoice.tax_totals[0].tax_amount.value, dec!(232.50));
    assert_eq!(totals.payable_amount.value, dec!(1162.50));
}

#[test]
fn prepaid_reduces_the_payable_amount() {
    let invoice = InvoiceBuilder::new("INV-2025-0103", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
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
        .prepaid(dec!(500.00))
        .build()
        .unwrap();

    let totals = &invoice.monetary_total;
    assert_eq!(totals.prepaid_amount.as_ref().unwrap().value, dec!(500.00));
    assert_eq!(totals.payable_amount.value, dec!(1431.25));
}

#[test]
fn payable_rounding_is_added_to_the_payable_amount() {
    let invoice = InvoiceBuilder::new("INV-2025-0104", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
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
        .payable_rounding(dec!(-0.25))
        .build()
        .unwrap();

    let totals = &invoice.monetary_total;
    assert_eq!(
        totals.payable_rounding_amount.as_ref().unwrap().value,
        dec!(-0.25)
    );
    assert_eq!(totals.payable_amount.value, dec!(1931.00));
}

#[test]
fn tax_currency_adds_a_converted_tax_total() {
    let invoice = InvoiceBuilder::new("INV-2025-0105", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .supplier(supplier())
        .customer(customer())
        .tax_currency("SEK", dec!(4369.06))
        .add_line(
            LineBuilder::new("1", "Licence", dec!(1), "C62", dec!(1545.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap();

    assert_eq!(invoice.tax_currency_code.as_deref(), Some("SEK"));
    assert_eq!(invoice.tax_totals.len(), 2);
    assert_eq!(invoice.tax_totals[0].tax_amount.currency, "EUR");
    assert!(!invoice.tax_totals[0].subtotals.is_empty());
    assert_eq!(invoice.tax_totals[1].tax_amount.currency, "SEK");
    assert_eq!(invoice.tax_totals[1].tax_amount.value, dec!(4369.06));
    assert!(invoice.tax_totals[1].subtotals.is_empty());
}

// ---------------------------------------------------------------------------
// Line computation
// ---------------------------------------------------------------------------

#[test]
fn line_extension_from_quantity_and_price() {
    let line = LineBuilder::new("1", "Consulting", dec!(7.5), "HUR", dec!(120.00))
        .tax(TaxCategoryCode::StandardRate, dec!(19))
        .build();
    assert_eq!(line.line_extension_amount.value, dec!(900.00));
}

#[test]
fn line_extension_honours_the_base_quantity() {
    let line = LineBuilder::new("1", "Bulk screws", dec!(200), "C62", dec!(50.00))
        .tax(TaxCategoryCode::StandardRate, dec!(25))
        .base_quantity(dec!(100), None)
        .build();
    // 200 / 100 units of 50.00 each.
    assert_eq!(line.line_extension_amount.value, dec!(100.00));
}

#[test]
fn line_allowances_and_charges_adjust_the_extension() {
    let line = LineBuilder::new("1", "Appliance", dec!(5), "C62", dec!(90.00))
        .tax(TaxCategoryCode::StandardRate, dec!(25))
        .add_allowance(AllowanceCharge {
            charge_indicator: false,
            reason_code: None,
            reason: Some("Bundle discount".into()),
            multiplier_factor: None,
            amount: MonetaryAmount::new(dec!(25.00), "EUR"),
            base_amount: None,
            tax_category: None,
        })
        .add_charge(AllowanceCharge {
            charge_indicator: true,
            reason_code: None,
            reason: Some("Handling".into()),
            multiplier_factor: None,
            amount: MonetaryAmount::new(dec!(10.00), "EUR"),
            base_amount: None,
            tax_category: None,
        })
        .build();
    assert_eq!(line.line_extension_amount.value, dec!(435.00));
}

#[test]
fn gross_price_records_a_price_allowance() {
    let line = LineBuilder::new("1", "Monitor", dec!(2), "C62", dec!(90.00))
        .tax(TaxCategoryCode::StandardRate, dec!(25))
        .gross_price(dec!(100.00))
        .build();
    let allowance = line.price.allowance.as_ref().unwrap();
    assert_eq!(allowance.amount.value, dec!(10.00));
    assert_eq!(allowance.base_amount.as_ref().unwrap().value, dec!(100.00));
    // The extension uses the net price.
    assert_eq!(line.line_extension_amount.value, dec!(180.00));
}

#[test]
fn gross_price_without_discount_is_dropped() {
    let line = LineBuilder::new("1", "Monitor", dec!(2), "C62", dec!(100.00))
        .tax(TaxCategoryCode::StandardRate, dec!(25))
        .gross_price(dec!(100.00))
        .build();
    assert!(line.price.allowance.is_none());
}

// ---------------------------------------------------------------------------
// Builder validation
// ---------------------------------------------------------------------------

#[test]
fn build_requires_a_supplier() {
    let err = InvoiceBuilder::new("INV-1", date(2025, 11, 3))
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Item", dec!(1), "C62", dec!(10.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::Missing("supplier")));
}

#[test]
fn build_requires_a_customer() {
    let err = InvoiceBuilder::new("INV-1", date(2025, 11, 3))
        .supplier(supplier())
        .add_line(
            LineBuilder::new("1", "Item", dec!(1), "C62", dec!(10.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::Missing("customer")));
}

#[test]
fn build_rejects_an_empty_invoice_id() {
    let err = InvoiceBuilder::new("  ", date(2025, 11, 3))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Item", dec!(1), "C62", dec!(10.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::EmptyField("invoice id")));
}

#[test]
fn build_rejects_an_oversized_invoice_id() {
    let err = InvoiceBuilder::new("R".repeat(201), date(2025, 11, 3))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Item", dec!(1), "C62", dec!(10.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::FieldTooLong { .. }));
}

#[test]
fn build_rejects_an_invoice_without_lines() {
    let err = InvoiceBuilder::new("INV-1", date(2025, 11, 3))
        .supplier(supplier())
        .customer(customer())
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::NoLines));
}

#[test]
fn sales_order_id_fills_the_order_reference_placeholder() {
    let invoice = InvoiceBuilder::new("INV-2025-0106", date(2025, 11, 3))
        .due_date(date(2025, 12, 3))
        .buyer_reference("COST-CENTRE-42")
        .sales_order_id("SO-778")
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineBuilder::new("1", "Item", dec!(1), "C62", dec!(10.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap();

    let order = invoice.order_reference.as_ref().unwrap();
    assert_eq!(order.id, "NA");
    assert_eq!(order.sales_order_id.as_deref(), Some("SO-778"));
}

// ---------------------------------------------------------------------------
// Model defaults and helpers
// ---------------------------------------------------------------------------

#[test]
fn builder_defaults_to_bis_billing() {
    let invoice = two_line_invoice();
    assert_eq!(invoice.customization_id, BIS_CUSTOMIZATION_ID);
    assert_eq!(invoice.profile_id, BIS_PROFILE_ID);
    assert_eq!(invoice.type_code, InvoiceTypeCode::Commercial);
    assert_eq!(invoice.currency_code, "EUR");
}

#[test]
fn party_vat_id_lookup() {
    let party = supplier();
    assert_eq!(party.vat_id(), Some("DE123456789"));

    let without = PartyBuilder::new(
        "Plain Org",
        AddressBuilder::new("Berlin", "10115", "DE").build(),
    )
    .tax_number("75/123/45678")
    .build();
    assert_eq!(without.vat_id(), None);
}

#[test]
fn legal_name_overrides_the_registration_name() {
    let party = PartyBuilder::new(
        "Nordwind",
        AddressBuilder::new("Berlin", "10115", "DE").build(),
    )
    .legal_name("Nordwind Software GmbH")
    .build();
    assert_eq!(party.name, "Nordwind");
    assert_eq!(
        party.legal_entity.registration_name,
        "Nordwind Software GmbH"
    );

    // Without a legal name the trading name doubles as registration name.
    let plain = supplier();
    assert_eq!(plain.legal_entity.registration_name, plain.name);
}

#[test]
fn rounding_is_half_up_at_midpoints() {
    assert_eq!(round_half_up(dec!(0.025), 2), dec!(0.03));
    assert_eq!(round_half_up(dec!(0.035), 2), dec!(0.04));
    assert_eq!(round_half_up(dec!(486.245), 2), dec!(486.25));
    assert_eq!(round_half_up(dec!(-0.025), 2), dec!(-0.03));
    assert_eq!(round_half_up(dec!(18.981), 2), dec!(18.98));
}

#[test]
fn code_enums_map_both_ways() {
    assert_eq!(InvoiceTypeCode::Commercial.code(), "380");
    assert_eq!(
        InvoiceTypeCode::from_code("381"),
        InvoiceTypeCode::CreditNote
    );
    assert_eq!(TaxCategoryCode::StandardRate.code(), "S");
    assert_eq!(
        TaxCategoryCode::from_code("AE"),
        TaxCategoryCode::ReverseCharge
    );
    assert_eq!(PaymentMeansCode::SepaCreditTransfer.code(), "58");
    assert_eq!(
        PaymentMeansCode::from_code("59"),
        PaymentMeansCode::SepaDirectDebit
    );
    assert_eq!(TaxSchemeCode::Vat.code(), "VAT");
    assert_eq!(TaxSchemeCode::from_code("FC"), TaxSchemeCode::LocalTax);
}

#[test]
fn direct_debit_codes_are_recognised() {
    assert!(PaymentMeansCode::DirectDebit.is_direct_debit());
    assert!(PaymentMeansCode::SepaDirectDebit.is_direct_debit());
    assert!(!PaymentMeansCode::SepaCreditTransfer.is_direct_debit());
    assert!(!PaymentMeansCode::InCash.is_direct_debit());
}

#[test]
fn exemption_reasons_required_by_category() {
    assert!(TaxCategoryCode::Exempt.needs_exemption_reason());
    assert!(TaxCategoryCode::ReverseCharge.needs_exemption_reason());
    assert!(TaxCategoryCode::IntraCommunity.needs_exemption_reason());
    assert!(!TaxCategoryCode::StandardRate.needs_exemption_reason());
    assert!(!TaxCategoryCode::ZeroRated.needs_exemption_reason());
}

#[test]
fn monetary_amount_scale_check() {
    assert!(MonetaryAmount::new(dec!(10.50), "EUR").has_standard_scale());
    assert!(MonetaryAmount::new(dec!(10.500), "EUR").has_standard_scale());
    assert!(MonetaryAmount::new(dec!(10), "EUR").has_standard_scale());
    assert!(!MonetaryAmount::new(dec!(10.505), "EUR").has_standard_scale());
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

#[test]
fn invoice_round_trips_through_json() {
    let invoice = two_line_invoice();
    let json = serde_json::to_string(&invoice).unwrap();
    let back: Invoice = serde_json::from_str(&json).unwrap();
    assert_eq!(back, invoice);
}

#[test]
fn decimals_serialize_as_strings() {
    let invoice = two_line_invoice();
    let json = serde_json::to_string(&invoice).unwrap();
    // rust_decimal with serde-with-str keeps amounts exact in JSON.
    assert!(json.contains(r#""value":"1931.25""#));
    assert!(!json.contains(r#""value":1931.25"#));
}

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

#[test]
fn build_errors_render_readably() {
    assert_eq!(
        BuildError::Missing("supplier").to_string(),
        "supplier is required"
    );
    assert_eq!(BuildError::NoLines.to_string(), "invoice has no lines");
}

#[test]
fn structural_errors_carry_their_path() {
    let err = StructuralError::MissingElement {
        path: "Invoice.ID".into(),
    };
    assert_eq!(err.to_string(), "Invoice.ID: required element missing");

    let err = StructuralError::AmountScale {
        path: "Invoice.LegalMonetaryTotal.PayableAmount".into(),
        value: "10.005".into(),
    };
    assert!(err.to_string().contains("more than 2 fractional digits"));
}
