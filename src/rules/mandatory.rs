//! Conditional mandatoriness rules.
//!
//! Fields that EN 16931 and Peppol BIS 3.0 require only in context: a due
//! date once something is payable, an exemption reason once an exempt
//! category appears in the breakdown, a mandate once direct debit is the
//! chosen means.

use rust_decimal::Decimal;

use crate::codelist::CodeListResolver;
use crate::core::{Invoice, TaxCategoryCode};

use super::{allowance_charges, text_absent, RuleDef, Severity, Violations};

pub(super) static RULES: &[RuleDef] = &[
    RuleDef {
        id: "BR-CO-25",
        severity: Severity::Fatal,
        description: "a positive payable amount requires a due date or payment terms",
        check: payment_due,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R003",
        severity: Severity::Fatal,
        description: "a buyer reference or an order reference is required",
        check: buyer_or_order_reference,
    },
    RuleDef {
        id: "BR-CO-26",
        severity: Severity::Fatal,
        description: "the seller must be identifiable by identifier, registration, or VAT number",
        check: supplier_identification,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R020",
        severity: Severity::Fatal,
        description: "the seller electronic address is required",
        check: supplier_endpoint,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R010",
        severity: Severity::Fatal,
        description: "the buyer electronic address is required",
        check: customer_endpoint,
    },
    RuleDef {
        id: "BR-32",
        severity: Severity::Fatal,
        description: "each document level allowance must have a VAT category",
        check: allowance_tax_category,
    },
    RuleDef {
        id: "BR-37",
        severity: Severity::Fatal,
        description: "each document level charge must have a VAT category",
        check: charge_tax_category,
    },
    RuleDef {
        id: "BR-33",
        severity: Severity::Fatal,
        description: "each document level allowance must have a reason or reason code",
        check: allowance_reason,
    },
    RuleDef {
        id: "BR-38",
        severity: Severity::Fatal,
        description: "each document level charge must have a reason or reason code",
        check: charge_reason,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R041",
        severity: Severity::Fatal,
        description: "an allowance/charge percentage requires a base amount",
        check: percentage_requires_base,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R042",
        severity: Severity::Fatal,
        description: "an allowance/charge base amount requires a percentage",
        check: base_requires_percentage,
    },
    RuleDef {
        id: "PEPPOL-EN16931-R061",
        severity: Severity::Fatal,
        description: "direct debit requires a mandate reference",
        check: direct_debit_mandate,
    },
    RuleDef {
        id: "BR-CO-18",
        severity: Severity::Fatal,
        description: "at least one VAT breakdown is required",
        check: tax_breakdown_present,
    },
    RuleDef {
        id: "BR-E-10",
        severity: Severity::Fatal,
        description: "an exempt breakdown must state its exemption reason",
        check: exemption_reason_exempt,
    },
    RuleDef {
        id: "BR-AE-10",
        severity: Severity::Fatal,
        description: "a reverse charge breakdown must state its exemption reason",
        check: exemption_reason_reverse_charge,
    },
    RuleDef {
        id: "BR-IC-10",
        severity: Severity::Fatal,
        description: "an intra-community breakdown must state its exemption reason",
        check: exemption_reason_intra_community,
    },
    RuleDef {
        id: "BR-G-10",
        severity: Severity::Fatal,
        description: "an export breakdown must state its exemption reason",
        check: exemption_reason_export,
    },
    RuleDef {
        id: "BR-O-10",
        severity: Severity::Fatal,
        description: "an out-of-scope breakdown must state its exemption reason",
        check: exemption_reason_out_of_scope,
    },
];

fn payment_due(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let payable = invoice.monetary_total.payable_amount.value;
    let has_terms = invoice
        .payment_terms
        .as_ref()
        .is_some_and(|t| !t.note.is_empty());
    if payable > Decimal::ZERO && invoice.due_date.is_none() && !has_terms {
        out.report(
            "Invoice.DueDate",
            format!("payable amount {payable} requires a due date or payment terms"),
        );
    }
}

fn buyer_or_order_reference(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let has_buyer_ref = invoice
        .buyer_reference
        .as_deref()
        .is_some_and(|r| !r.is_empty());
    let has_order_ref = invoice
        .order_reference
        .as_ref()
        .is_some_and(|r| !r.id.is_empty());
    if !has_buyer_ref && !has_order_ref {
        out.report(
            "Invoice.BuyerReference",
            "either a buyer reference or an order reference is required",
        );
    }
}

fn supplier_identification(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    let party = &invoice.supplier;
    let identified = !party.identifications.is_empty();
    let registered = party.legal_entity.company_id.is_some();
    let vat = party.vat_id().is_some();
    if !identified && !registered && !vat {
        out.report(
            "Invoice.AccountingSupplierParty.Party",
            "the seller needs an identifier, a legal registration identifier, or a VAT identifier",
        );
    }
}

fn supplier_endpoint(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    if invoice.supplier.endpoint.is_none() {
        out.report(
            "Invoice.AccountingSupplierParty.Party.EndpointID",
            "the seller electronic address is required",
        );
    }
}

fn customer_endpoint(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    if invoice.customer.endpoint.is_none() {
        out.report(
            "Invoice.AccountingCustomerParty.Party.EndpointID",
            "the buyer electronic address is required",
        );
    }
}

fn document_tax_category(invoice: &Invoice, charge: bool, out: &mut Violations) {
    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        if ac.charge_indicator == charge && ac.tax_category.is_none() {
            let kind = if charge { "charge" } else { "allowance" };
            out.report(
                format!("Invoice.AllowanceCharge[{i}].TaxCategory"),
                format!("each document level {kind} must have a VAT category code"),
            );
        }
    }
}

fn allowance_tax_category(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    document_tax_category(invoice, false, out);
}

fn charge_tax_category(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    document_tax_category(invoice, true, out);
}

fn document_reason(invoice: &Invoice, charge: bool, out: &mut Violations) {
    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        if ac.charge_indicator == charge && text_absent(&ac.reason) && text_absent(&ac.reason_code)
        {
            let kind = if charge { "charge" } else { "allowance" };
            out.report(
                format!("Invoice.AllowanceCharge[{i}].AllowanceChargeReason"),
                format!("each document level {kind} must have a reason or reason code"),
            );
        }
    }
}

fn allowance_reason(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    document_reason(invoice, false, out);
}

fn charge_reason(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    document_reason(invoice, true, out);
}

fn percentage_requires_base(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (path, ac) in allowance_charges(invoice) {
        if ac.multiplier_factor.is_some() && ac.base_amount.is_none() {
            out.report(
                format!("{path}.BaseAmount"),
                "a base amount is required when a percentage is given",
            );
        }
    }
}

fn base_requires_percentage(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (path, ac) in allowance_charges(invoice) {
        if ac.base_amount.is_some() && ac.multiplier_factor.is_none() {
            out.report(
                format!("{path}.MultiplierFactorNumeric"),
                "a percentage is required when a base amount is given",
            );
        }
    }
}

fn direct_debit_mandate(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, means) in invoice.payment_means.iter().enumerate() {
        let has_mandate = means
            .mandate
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .is_some_and(|id| !id.is_empty());
        if means.code.is_direct_debit() && !has_mandate {
            out.report(
                format!("Invoice.PaymentMeans[{i}].PaymentMandate"),
                format!(
                    "payment means {} (direct debit) requires a mandate reference",
                    means.code.code()
                ),
            );
        }
    }
}

fn tax_breakdown_present(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    if invoice.tax_totals.iter().all(|t| t.subtotals.is_empty()) {
        out.report("Invoice.TaxTotal", "at least one VAT breakdown is required");
    }
}

fn exemption_reason(invoice: &Invoice, category: TaxCategoryCode, out: &mut Violations) {
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        for (j, sub) in total.subtotals.iter().enumerate() {
            if sub.category.code == category
                && text_absent(&sub.exemption_reason)
                && text_absent(&sub.exemption_reason_code)
            {
                out.report(
                    format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxExemptionReason"),
                    format!(
                        "VAT category {} requires an exemption reason or reason code",
                        sub.category.code.code()
                    ),
                );
            }
        }
    }
}

fn exemption_reason_exempt(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    exemption_reason(invoice, TaxCategoryCode::Exempt, out);
}

fn exemption_reason_reverse_charge(
    invoice: &Invoice,
    _resolver: &dyn CodeListResolver,
    out: &mut Violations,
) {
    exemption_reason(invoice, TaxCategoryCode::ReverseCharge, out);
}

fn exemption_reason_intra_community(
    invoice: &Invoice,
    _resolver: &dyn CodeListResolver,
    out: &mut Violations,
) {
    exemption_reason(invoice, TaxCategoryCode::IntraCommunity, out);
}

fn exemption_reason_export(invoice: &Invoice, _resolver: &dyn CodeListResolver, out: &mut Violations) {
    exemption_reason(invoice, TaxCategoryCode::Export, out);
}

fn exemption_reason_out_of_scope(
    invoice: &Invoice,
    _resolver: &dyn CodeListResolver,
    out: &mut Violations,
) {
    exemption_reason(invoice, TaxCategoryCode::OutOfScope, out);
}
