//! Arithmetic identity rules.
//!
//! Totals must equal the folds of their constituents. Sums are compared
//! with a fixed tolerance of 0.01 in the document currency to absorb
//! line-level rounding; the per-category VAT computation (BR-CO-17) is
//! exact after half-up rounding to 2 decimals, so an off-by-one-cent
//! breakdown is a violation even though the totals above it still close.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::codelist::CodeListResolver;
use crate::core::{round_half_up, Invoice, MonetaryAmount, TaxCategoryCode};

use super::{allowance_charges, RuleDef, Severity, Violations};

/// Tolerance for summed amounts in the document currency.
const EPSILON: Decimal = dec!(0.01);

pub(super) static RULES: &[RuleDef] = &[
    RuleDef {
        id: "BR-CO-10",
        severity: Severity::Fatal,
        description: "the line extension total equals the sum of line net amounts",
        check: line_extension_total,
    },
    RuleDef {
        id: "BR-CO-11",
        severity: Severity::Fatal,
        description: "the allowance total equals the sum of document allowances",
        check: allowance_total,
    },
    RuleDef {
        id: "BR-CO-12",
        severity: Severity::Fatal,
        description: "the charge total equals the sum of document charges",
        check: charge_total,
    },
    RuleDef {
        id: "BR-CO-13",
        severity: Severity::Fatal,
        description: "the tax exclusive amount equals lines minus allowances plus charges",
        check: tax_exclusive,
    },
    RuleDef {
        id: "BR-CO-15",
        severity: Severity::Fatal,
        description: "the tax inclusive amount equals the tax exclusive amount plus VAT",
        check: tax_inclusive,
    },
    RuleDef {
        id: "BR-CO-16",
        severity: Severity::Fatal,
        description: "the payable amount equals total minus prepaid plus rounding",
        check: payable,
    },
    RuleDef {
        id: "BR-CO-14",
        severity: Severity::Fatal,
        description: "each tax total equals the sum of its subtotals",
        check: tax_total_sum,
    },
    RuleDef {
        id: "BR-CO-17",
        severity: Severity::Fatal,
        description: "each subtotal tax amount is taxable x rate, half-up to 2 decimals",
        check: subtotal_tax_exact,
    },
    RuleDef {
        id: "BR-S-05",
        severity: Severity::Fatal,
        description: "standard rate entries carry a rate greater than zero",
        check: rate_standard,
    },
    RuleDef {
        id: "BR-Z-05",
        severity: Severity::Fatal,
        description: "zero rated entries carry a rate of zero",
        check: rate_zero_rated,
    },
    RuleDef {
        id: "BR-E-05",
        severity: Severity::Fatal,
        description: "exempt entries carry a rate of zero",
        check: rate_exempt,
    },
    RuleDef {
        id: "BR-AE-05",
        severity: Severity::Fatal,
        description: "reverse charge entries carry a rate of zero",
        check: rate_reverse_charge,
    },
    RuleDef {
        id: "BR-IC-05",
        severity: Severity::Fatal,
        description: "intra-community entries carry a rate of zero",
        check: rate_intra_community,
    },
    RuleDef {
        id: "BR-G-05",
        severity: Severity::Fatal,
        description: "export entries carry a rate of zero",
        check: rate_export,
    },
    RuleDef {
        id: "BR-O-05",
        severity: Severity::Fatal,
        description: "out-of-scope entries carry no rate",
        check: rate_out_of_scope,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R120",
        severity: Severity::Fatal,
        description: "each line net amount follows from quantity, price, and line allowances",
        check: line_extension_formula,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R040",
        severity: Severity::Fatal,
        description: "each allowance/charge amount follows from its base and percentage",
        check: allowance_charge_amount,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R121",
        severity: Severity::Fatal,
        description: "a price base quantity is positive",
        check: base_quantity_positive,
    },
    RuleDef {
        id: "BR-27",
        severity: Severity::Fatal,
        description: "the item net price is not negative",
        check: price_not_negative,
    },
];

fn stated(amount: &Option<MonetaryAmount>) -> Decimal {
    amount.as_ref().map_or(Decimal::ZERO, |a| a.value)
}

/// VAT total in the document currency: the tax total whose currency
/// matches the document currency, falling back to the one carrying the
/// breakdown.
fn document_vat(invoice: &Invoice) -> Decimal {
    invoice
        .tax_totals
        .iter()
        .find(|t| t.tax_amount.currency == invoice.currency_code)
        .or_else(|| invoice.tax_totals.iter().find(|t| !t.subtotals.is_empty()))
        .map_or(Decimal::ZERO, |t| t.tax_amount.value)
}

fn line_extension_total(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let sum: Decimal = invoice
        .lines
        .iter()
        .map(|l| l.line_extension_amount.value)
        .sum();
    let total = invoice.monetary_total.line_extension_amount.value;
    if (total - sum).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.LineExtensionAmount",
            format!("stated {total} does not match the sum of line net amounts {sum}"),
        );
    }
}

fn allowance_total(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let sum: Decimal = invoice
        .allowance_charges
        .iter()
        .filter(|ac| !ac.charge_indicator)
        .map(|ac| ac.amount.value)
        .sum();
    let total = stated(&invoice.monetary_total.allowance_total_amount);
    if (total - sum).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.AllowanceTotalAmount",
            format!("stated {total} does not match the sum of document allowances {sum}"),
        );
    }
}

fn charge_total(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let sum: Decimal = invoice
        .allowance_charges
        .iter()
        .filter(|ac| ac.charge_indicator)
        .map(|ac| ac.amount.value)
        .sum();
    let total = stated(&invoice.monetary_total.charge_total_amount);
    if (total - sum).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.ChargeTotalAmount",
            format!("stated {total} does not match the sum of document charges {sum}"),
        );
    }
}

fn tax_exclusive(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let totals = &invoice.monetary_total;
    let expected = totals.line_extension_amount.value - stated(&totals.allowance_total_amount)
        + stated(&totals.charge_total_amount);
    let actual = totals.tax_exclusive_amount.value;
    if (actual - expected).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.TaxExclusiveAmount",
            format!("stated {actual} does not match lines minus allowances plus charges = {expected}"),
        );
    }
}

fn tax_inclusive(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let totals = &invoice.monetary_total;
    let expected = totals.tax_exclusive_amount.value + document_vat(invoice);
    let actual = totals.tax_inclusive_amount.value;
    if (actual - expected).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.TaxInclusiveAmount",
            format!("stated {actual} does not match tax exclusive amount plus VAT = {expected}"),
        );
    }
}

fn payable(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let totals = &invoice.monetary_total;
    let expected = totals.tax_inclusive_amount.value - stated(&totals.prepaid_amount)
        + stated(&totals.payable_rounding_amount);
    let actual = totals.payable_amount.value;
    if (actual - expected).abs() > EPSILON {
        out.report(
            "Invoice.LegalMonetaryTotal.PayableAmount",
            format!("stated {actual} does not match total minus prepaid plus rounding = {expected}"),
        );
    }
}

fn tax_total_sum(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        if total.subtotals.is_empty() {
            continue;
        }
        let sum: Decimal = total.subtotals.iter().map(|s| s.tax_amount.value).sum();
        let actual = total.tax_amount.value;
        if (actual - sum).abs() > EPSILON {
            out.report(
                format!("Invoice.TaxTotal[{i}].TaxAmount"),
                format!("stated {actual} does not match the sum of subtotal tax amounts {sum}"),
            );
        }
    }
}

fn subtotal_tax_exact(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        for (j, sub) in total.subtotals.iter().enumerate() {
            let Some(percent) = sub.category.percent else {
                continue;
            };
            let expected = round_half_up(sub.taxable_amount.value * percent / dec!(100), 2);
            if sub.tax_amount.value != expected {
                out.report(
                    format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxAmount"),
                    format!(
                        "tax amount {} does not equal taxable {} x {}% = {}",
                        sub.tax_amount.value, sub.taxable_amount.value, percent, expected
                    ),
                );
            }
        }
    }
}

enum RateRule {
    Positive,
    ZeroOrAbsent,
    Absent,
}

/// Checks the rate constraint for one category across the breakdown,
/// document allowances/charges, and line items, in model order.
fn rate_constraint(
    invoice: &Invoice,
    category: TaxCategoryCode,
    expected: RateRule,
    out: &mut Violations,
) {
    let mut check = |path: String, percent: Option<Decimal>, out: &mut Violations| {
        let broken = match expected {
            RateRule::Positive => percent.map_or(true, |p| p <= Decimal::ZERO),
            RateRule::ZeroOrAbsent => percent.is_some_and(|p| p != Decimal::ZERO),
            RateRule::Absent => percent.is_some(),
        };
        if broken {
            let requirement = match expected {
                RateRule::Positive => "a rate greater than zero",
                RateRule::ZeroOrAbsent => "a rate of zero",
                RateRule::Absent => "no rate",
            };
            out.report(
                path,
                format!("VAT category {} requires {requirement}", category.code()),
            );
        }
    };

    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        if let Some(tc) = &ac.tax_category {
            if tc.code == category {
                check(
                    format!("Invoice.AllowanceCharge[{i}].TaxCategory.Percent"),
                    tc.percent,
                    out,
                );
            }
        }
    }
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        for (j, sub) in total.subtotals.iter().enumerate() {
            if sub.category.code == category {
                check(
                    format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].Percent"),
                    sub.category.percent,
                    out,
                );
            }
        }
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        if line.item.tax_category.code == category {
            check(
                format!("Invoice.InvoiceLine[{i}].Item.ClassifiedTaxCategory.Percent"),
                line.item.tax_category.percent,
                out,
            );
        }
    }
}

fn rate_standard(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::StandardRate, RateRule::Positive, out);
}

fn rate_zero_rated(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::ZeroRated, RateRule::ZeroOrAbsent, out);
}

fn rate_exempt(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::Exempt, RateRule::ZeroOrAbsent, out);
}

fn rate_reverse_charge(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::ReverseCharge, RateRule::ZeroOrAbsent, out);
}

fn rate_intra_community(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::IntraCommunity, RateRule::ZeroOrAbsent, out);
}

fn rate_export(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::Export, RateRule::ZeroOrAbsent, out);
}

fn rate_out_of_scope(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    rate_constraint(invoice, TaxCategoryCode::OutOfScope, RateRule::Absent, out);
}

fn line_extension_formula(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, line) in invoice.lines.iter().enumerate() {
        let base_qty = line
            .price
            .base_quantity
            .as_ref()
            .map_or(Decimal::ONE, |b| b.value);
        if base_qty.is_zero() {
            // PEPPOL-EN16931-R121 reports this; the formula is undefined.
            continue;
        }
        let mut expected = line.quantity.value * line.price.amount.value / base_qty;
        for ac in &line.allowance_charges {
            if ac.charge_indicator {
                expected += ac.amount.value;
            } else {
                expected -= ac.amount.value;
            }
        }
        let expected = round_half_up(expected, 2);
        let actual = line.line_extension_amount.value;
        if (actual - expected).abs() > EPSILON {
            out.report(
                format!("Invoice.InvoiceLine[{i}].LineExtensionAmount"),
                format!(
                    "line net amount {} does not match quantity {} x price {} = {}",
                    actual, line.quantity.value, line.price.amount.value, expected
                ),
            );
        }
    }
}

fn allowance_charge_amount(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (path, ac) in allowance_charges(invoice) {
        let (Some(factor), Some(base)) = (ac.multiplier_factor, ac.base_amount.as_ref()) else {
            continue;
        };
        let expected = round_half_up(base.value * factor / dec!(100), 2);
        if (ac.amount.value - expected).abs() > EPSILON {
            out.report(
                format!("{path}.Amount"),
                format!(
                    "amount {} does not match base {} x {}% = {}",
                    ac.amount.value, base.value, factor, expected
                ),
            );
        }
    }
}

fn base_quantity_positive(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, line) in invoice.lines.iter().enumerate() {
        if let Some(base) = &line.price.base_quantity {
            if base.value <= Decimal::ZERO {
                out.report(
                    format!("Invoice.InvoiceLine[{i}].Price.BaseQuantity"),
                    format!("base quantity {} must be positive", base.value),
                );
            }
        }
    }
}

fn price_not_negative(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, line) in invoice.lines.iter().enumerate() {
        if line.price.amount.value.is_sign_negative() {
            out.report(
                format!("Invoice.InvoiceLine[{i}].Price.PriceAmount"),
                format!("item net price {} must not be negative", line.price.amount.value),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::codelist::NoLists;
    use crate::core::{BaseQuantity, TaxCategory, TaxCategoryCode};
    use crate::rules::{test_invoice, validate, Severity, Violation};

    fn rules_of(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn broken_line_sum_reported() {
        let mut invoice = test_invoice();
        invoice.monetary_total.line_extension_amount.value += dec!(10.00);
        let violations = validate(&invoice, &NoLists);
        let violation = violations.iter().find(|v| v.rule == "BR-CO-10").unwrap();
        assert_eq!(violation.severity, Severity::Fatal);
        assert_eq!(
            violation.path,
            "Invoice.LegalMonetaryTotal.LineExtensionAmount"
        );
    }

    #[test]
    fn one_cent_deviation_tolerated_on_sums() {
        let mut invoice = test_invoice();
        invoice.monetary_total.payable_amount.value += dec!(0.01);
        let violations = validate(&invoice, &NoLists);
        assert!(!rules_of(&violations).contains(&"BR-CO-16"));

        invoice.monetary_total.payable_amount.value += dec!(0.01);
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-CO-16"));
    }

    #[test]
    fn subtotal_tax_is_exact_after_half_up_rounding() {
        use chrono::NaiveDate;

        use crate::codelist::BuiltinLists;
        use crate::core::{InvoiceBuilder, LineBuilder};

        // 1945.00 x 25% = 486.25 exactly; 486.24 is a violation even
        // though the 0.01 tolerance would let the sums above it close.
        let base = test_invoice();
        let mut invoice = InvoiceBuilder::new(
            "INV-2025-0043",
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        )
        .due_date(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap())
        .buyer_reference("COST-CENTRE-42")
        .supplier(base.supplier.clone())
        .customer(base.customer.clone())
        .add_line(
            LineBuilder::new("1", "Consulting", dec!(1), "HUR", dec!(1945.00))
                .tax(TaxCategoryCode::StandardRate, dec!(25))
                .build(),
        )
        .build()
        .unwrap();
        assert_eq!(invoice.tax_totals[0].subtotals[0].tax_amount.value, dec!(486.25));

        let violations = validate(&invoice, &BuiltinLists);
        assert!(violations.is_empty(), "{violations:?}");

        invoice.tax_totals[0].subtotals[0].tax_amount.value = dec!(486.24);
        let violations = validate(&invoice, &BuiltinLists);
        let rules = rules_of(&violations);
        assert!(rules.contains(&"BR-CO-17"));
        // The breakdown sum is off by exactly one cent, inside tolerance.
        assert!(!rules.contains(&"BR-CO-14"));
    }

    #[test]
    fn standard_rate_must_be_positive() {
        let mut invoice = test_invoice();
        invoice.tax_totals[0].subtotals[0].category = TaxCategory {
            code: TaxCategoryCode::StandardRate,
            percent: Some(dec!(0)),
        };
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-S-05"));
    }

    #[test]
    fn zero_rated_must_not_carry_a_rate() {
        let mut invoice = test_invoice();
        invoice.tax_totals[0].subtotals[0].category = TaxCategory {
            code: TaxCategoryCode::ZeroRated,
            percent: Some(dec!(5)),
        };
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-Z-05"));
    }

    #[test]
    fn out_of_scope_must_not_carry_a_rate() {
        let mut invoice = test_invoice();
        invoice.tax_totals[0].subtotals[0].category = TaxCategory {
            code: TaxCategoryCode::OutOfScope,
            percent: Some(dec!(0)),
        };
        invoice.tax_totals[0].subtotals[0].exemption_reason = Some("Not subject to VAT".into());
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-O-05"));
    }

    #[test]
    fn line_formula_checked_per_line() {
        let mut invoice = test_invoice();
        invoice.lines[0].line_extension_amount.value = dec!(1499.00);
        let violations = validate(&invoice, &NoLists);
        let violation = violations
            .iter()
            .find(|v| v.rule == "PEPPOL-EN16931-R120")
            .unwrap();
        assert_eq!(violation.path, "Invoice.InvoiceLine[0].LineExtensionAmount");
    }

    #[test]
    fn zero_base_quantity_reported_once() {
        let mut invoice = test_invoice();
        invoice.lines[0].price.base_quantity = Some(BaseQuantity {
            value: dec!(0),
            unit_code: None,
        });
        let violations = validate(&invoice, &NoLists);
        let rules = rules_of(&violations);
        assert!(rules.contains(&"PEPPOL-EN16931-R121"));
        // The line formula is skipped rather than dividing by zero.
        assert!(!rules.contains(&"PEPPOL-EN16931-R120"));
    }

    #[test]
    fn negative_price_reported() {
        let mut invoice = test_invoice();
        invoice.lines[1].price.amount.value = dec!(-22.50);
        let violations = validate(&invoice, &NoLists);
        assert!(rules_of(&violations).contains(&"BR-27"));
    }
}
