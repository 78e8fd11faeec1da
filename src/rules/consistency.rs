//! Structural uniqueness and consistency rules.
//!
//! Line identifiers must not repeat, the VAT breakdown must not contain
//! the same (category, rate) pair twice, and every amount must be stated
//! in the document currency. The single exception is the converted VAT
//! total in the tax accounting currency, which in turn is only allowed
//! when a TaxCurrencyCode different from the document currency is given.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::codelist::CodeListResolver;
use crate::core::{Invoice, MonetaryAmount};

use super::{RuleDef, Severity, Violations};

pub(super) static RULES: &[RuleDef] = &[
    RuleDef {
        id: "BR-CO-04",
        severity: Severity::Fatal,
        description: "invoice line identifiers are unique",
        check: unique_line_ids,
    },
    RuleDef {
        id: "EN16931-BG-23",
        severity: Severity::Fatal,
        description: "each VAT category and rate pair appears in one breakdown only",
        check: unique_breakdown_keys,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R005",
        severity: Severity::Fatal,
        description: "the tax accounting currency differs from the document currency",
        check: tax_currency_differs,
    },
    RuleDef {
        id: "BR-53",
        severity: Severity::Fatal,
        description: "a tax total in the tax currency exists exactly when a TaxCurrencyCode is given",
        check: tax_currency_total,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R053",
        severity: Severity::Fatal,
        description: "exactly one tax total carries the VAT breakdown",
        check: single_breakdown_total,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R054",
        severity: Severity::Fatal,
        description: "at most one tax total without subtotals, in the tax currency only",
        check: converted_total_shape,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R051",
        severity: Severity::Fatal,
        description: "all amounts are stated in the document currency",
        check: currency_agreement,
    },
];

fn unique_line_ids(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let mut seen = HashSet::new();
    for (i, line) in invoice.lines.iter().enumerate() {
        if !seen.insert(line.id.as_str()) {
            out.report(
                format!("Invoice.InvoiceLine[{i}].ID"),
                format!("line identifier '{}' is used more than once", line.id),
            );
        }
    }
}

fn unique_breakdown_keys(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let mut seen: HashSet<(&str, Option<Decimal>)> = HashSet::new();
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        for (j, sub) in total.subtotals.iter().enumerate() {
            if !seen.insert((sub.category.code.code(), sub.category.percent)) {
                let rate = sub
                    .category
                    .percent
                    .map_or_else(|| "none".to_string(), |p| p.to_string());
                out.report(
                    format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxCategory"),
                    format!(
                        "duplicate VAT breakdown for category {} at rate {rate}",
                        sub.category.code.code()
                    ),
                );
            }
        }
    }
}

fn tax_currency_differs(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    if let Some(tax_currency) = &invoice.tax_currency_code {
        if *tax_currency == invoice.currency_code {
            out.report(
                "Invoice.TaxCurrencyCode",
                format!("tax currency {tax_currency} must differ from the document currency"),
            );
        }
    }
}

fn tax_currency_total(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    match &invoice.tax_currency_code {
        Some(tax_currency) => {
            let present = invoice
                .tax_totals
                .iter()
                .any(|t| t.tax_amount.currency == *tax_currency);
            if !present {
                out.report(
                    "Invoice.TaxTotal",
                    format!(
                        "a tax total in the tax currency {tax_currency} is required when a \
                         TaxCurrencyCode is given"
                    ),
                );
            }
        }
        None => {
            if invoice.tax_totals.len() > 1 {
                out.report(
                    "Invoice.TaxTotal",
                    "a second tax total requires a TaxCurrencyCode",
                );
            }
        }
    }
}

fn single_breakdown_total(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let with_subtotals = invoice
        .tax_totals
        .iter()
        .filter(|t| !t.subtotals.is_empty())
        .count();
    if with_subtotals != 1 {
        out.report(
            "Invoice.TaxTotal",
            format!("exactly one tax total with subtotals is required, found {with_subtotals}"),
        );
    }
}

fn converted_total_shape(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let tax_currency = invoice.tax_currency_code.as_deref();
    let mut bare = 0usize;
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        if !total.subtotals.is_empty() {
            continue;
        }
        bare += 1;
        if tax_currency != Some(total.tax_amount.currency.as_str()) {
            out.report(
                format!("Invoice.TaxTotal[{i}].TaxAmount"),
                "a tax total without subtotals must be stated in the tax accounting currency",
            );
        }
    }
    if bare > 1 {
        out.report(
            "Invoice.TaxTotal",
            format!("at most one tax total without subtotals is allowed, found {bare}"),
        );
    }
}

fn check_currency(out: &mut Violations, document: &str, path: String, amount: &MonetaryAmount) {
    if amount.currency != document {
        out.report(
            path,
            format!(
                "currencyID {} does not match the document currency {}",
                amount.currency, document
            ),
        );
    }
}

fn currency_agreement(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let document = invoice.currency_code.as_str();
    let tax_currency = invoice.tax_currency_code.as_deref();

    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        check_currency(
            out,
            document,
            format!("Invoice.AllowanceCharge[{i}].Amount"),
            &ac.amount,
        );
        if let Some(base) = &ac.base_amount {
            check_currency(
                out,
                document,
                format!("Invoice.AllowanceCharge[{i}].BaseAmount"),
                base,
            );
        }
    }

    for (i, total) in invoice.tax_totals.iter().enumerate() {
        let converted = total.subtotals.is_empty()
            && tax_currency == Some(total.tax_amount.currency.as_str());
        if !converted {
            check_currency(
                out,
                document,
                format!("Invoice.TaxTotal[{i}].TaxAmount"),
                &total.tax_amount,
            );
        }
        for (j, sub) in total.subtotals.iter().enumerate() {
            check_currency(
                out,
                document,
                format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxableAmount"),
                &sub.taxable_amount,
            );
            check_currency(
                out,
                document,
                format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxAmount"),
                &sub.tax_amount,
            );
        }
    }

    let totals = &invoice.monetary_total;
    check_currency(
        out,
        document,
        "Invoice.LegalMonetaryTotal.LineExtensionAmount".into(),
        &totals.line_extension_amount,
    );
    check_currency(
        out,
        document,
        "Invoice.LegalMonetaryTotal.TaxExclusiveAmount".into(),
        &totals.tax_exclusive_amount,
    );
    check_currency(
        out,
        document,
        "Invoice.LegalMonetaryTotal.TaxInclusiveAmount".into(),
        &totals.tax_inclusive_amount,
    );
    for (path, amount) in [
        (
            "Invoice.LegalMonetaryTotal.AllowanceTotalAmount",
            &totals.allowance_total_amount,
        ),
        (
            "Invoice.LegalMonetaryTotal.ChargeTotalAmount",
            &totals.charge_total_amount,
        ),
        (
            "Invoice.LegalMonetaryTotal.PrepaidAmount",
            &totals.prepaid_amount,
        ),
        (
            "Invoice.LegalMonetaryTotal.PayableRoundingAmount",
            &totals.payable_rounding_amount,
        ),
    ] {
        if let Some(amount) = amount {
            check_currency(out, document, path.into(), amount);
        }
    }
    check_currency(
        out,
        document,
        "Invoice.LegalMonetaryTotal.PayableAmount".into(),
        &totals.payable_amount,
    );

    for (i, line) in invoice.lines.iter().enumerate() {
        check_currency(
            out,
            document,
            format!("Invoice.InvoiceLine[{i}].LineExtensionAmount"),
            &line.line_extension_amount,
        );
        for (j, ac) in line.allowance_charges.iter().enumerate() {
            check_currency(
                out,
                document,
                format!("Invoice.InvoiceLine[{i}].AllowanceCharge[{j}].Amount"),
                &ac.amount,
            );
            if let Some(base) = &ac.base_amount {
                check_currency(
                    out,
                    document,
                    format!("Invoice.InvoiceLine[{i}].AllowanceCharge[{j}].BaseAmount"),
                    base,
                );
            }
        }
        check_currency(
            out,
            document,
            format!("Invoice.InvoiceLine[{i}].Price.PriceAmount"),
            &line.price.amount,
        );
        if let Some(allowance) = &line.price.allowance {
            check_currency(
                out,
                document,
                format!("Invoice.InvoiceLine[{i}].Price.AllowanceCharge.Amount"),
                &allowance.amount,
            );
            if let Some(base) = &allowance.base_amount {
                check_currency(
                    out,
                    document,
                    format!("Invoice.InvoiceLine[{i}].Price.AllowanceCharge.BaseAmount"),
                    base,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::codelist::{BuiltinLists, NoLists};
    use crate::core::{MonetaryAmount, TaxTotal};
    use crate::rules::{test_invoice, validate, Violation};

    fn rules_of(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn duplicate_line_id_flags_second_occurrence() {
        let mut invoice = test_invoice();
        invoice.lines[1].id = "1".to_string();
        let violations = validate(&invoice, &NoLists);
        let violation = violations.iter().find(|v| v.rule == "BR-CO-04").unwrap();
        assert_eq!(violation.path, "Invoice.InvoiceLine[1].ID");
    }

    #[test]
    fn duplicate_breakdown_pair_reported() {
        let mut invoice = test_invoice();
        let duplicate = invoice.tax_totals[0].subtotals[0].clone();
        invoice.tax_totals[0].subtotals.push(duplicate);
        let violations = validate(&invoice, &NoLists);
        let violation = violations.iter().find(|v| v.rule == "EN16931-BG-23").unwrap();
        assert_eq!(violation.path, "Invoice.TaxTotal[0].TaxSubtotal[1].TaxCategory");
    }

    #[test]
    fn tax_currency_must_differ() {
        let mut invoice = test_invoice();
        invoice.tax_currency_code = Some("EUR".to_string());
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"PEPPOL-EN16931-R005"));
    }

    #[test]
    fn declared_tax_currency_needs_its_total() {
        let mut invoice = test_invoice();
        invoice.tax_currency_code = Some("SEK".to_string());
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-53"));
    }

    #[test]
    fn tax_currency_total_accepted_when_declared() {
        use chrono::NaiveDate;

        use crate::core::{InvoiceBuilder, LineBuilder, TaxCategoryCode};

        let base = test_invoice();
        let invoice = InvoiceBuilder::new(
            "INV-2025-0044",
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        )
        .due_date(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap())
        .buyer_reference("COST-CENTRE-42")
        .supplier(base.supplier.clone())
        .customer(base.customer.clone())
        .tax_currency("SEK", dec!(4369.06))
        .add_line(
            LineBuilder::new("1", "Licence", dec!(1), "C62", dec!(1545.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap();
        assert_eq!(invoice.tax_totals.len(), 2);

        let violations = validate(&invoice, &BuiltinLists);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn second_total_without_declared_currency_rejected() {
        let mut invoice = test_invoice();
        invoice.tax_totals.push(TaxTotal {
            tax_amount: MonetaryAmount::new(dec!(386.25), "EUR"),
            subtotals: Vec::new(),
        });
        let violations = validate(&invoice, &NoLists);
        let rules = rules_of(&violations);
        assert!(rules.contains(&"BR-53"));
        assert!(rules.contains(&"PEPPOL-EN16931-R054"));
    }

    #[test]
    fn foreign_currency_amount_reported_with_path() {
        let mut invoice = test_invoice();
        invoice.lines[0].line_extension_amount.currency = "USD".to_string();
        let violations = validate(&invoice, &NoLists);
        let violation = violations
            .iter()
            .find(|v| v.rule == "PEPPOL-EN16931-R051")
            .unwrap();
        assert_eq!(violation.path, "Invoice.InvoiceLine[0].LineExtensionAmount");
    }
}
