//! Code-list membership rules.
//!
//! Every coded field is checked through the configured
//! [`CodeListResolver`]. A code the resolver knows to be wrong is fatal;
//! a code it cannot verify (list not configured) is only a warning, so
//! incomplete list data can never reject an otherwise valid document.

use crate::codelist::{lists, CodeListResolver, CodeStatus};
use crate::core::Invoice;

use super::{allowance_charges, RuleDef, Severity, Violations};

pub(super) static RULES: &[RuleDef] = &[
    RuleDef {
        id: "BR-CL-01",
        severity: Severity::Fatal,
        description: "the invoice type code is a UNTDID 1001 code",
        check: type_code,
    },
    RuleDef {
        id: "BR-CL-04",
        severity: Severity::Fatal,
        description: "the document currency is an ISO 4217 code",
        check: document_currency,
    },
    RuleDef {
        id: "BR-CL-05",
        severity: Severity::Fatal,
        description: "the tax accounting currency is an ISO 4217 code",
        check: tax_currency,
    },
    RuleDef {
        id: "BR-CL-14",
        severity: Severity::Fatal,
        description: "party country codes are ISO 3166-1 alpha-2 codes",
        check: address_countries,
    },
    RuleDef {
        id: "BR-CL-15",
        severity: Severity::Fatal,
        description: "item origin countries are ISO 3166-1 alpha-2 codes",
        check: origin_countries,
    },
    RuleDef {
        id: "BR-CL-16",
        severity: Severity::Fatal,
        description: "payment means codes are UNTDID 4461 codes",
        check: payment_means,
    },
    RuleDef {
        id: "BR-CL-17",
        severity: Severity::Fatal,
        description: "tax category codes are UNTDID 5305 codes",
        check: tax_categories,
    },
    RuleDef {
        id: "BR-CL-19",
        severity: Severity::Fatal,
        description: "allowance reason codes are UNTDID 5189 codes",
        check: allowance_reasons,
    },
    RuleDef {
        id: "BR-CL-20",
        severity: Severity::Fatal,
        description: "charge reason codes are UNTDID 7161 codes",
        check: charge_reasons,
    },
    RuleDef {
        id: "BR-CL-23",
        severity: Severity::Fatal,
        description: "unit codes are UN/CEFACT Recommendation 20 codes",
        check: unit_codes,
    },
    RuleDef {
        id: "BR-CL-25",
        severity: Severity::Fatal,
        description: "endpoint scheme identifiers are EAS codes",
        check: endpoint_schemes,
    },
];

/// Resolve one code and report per the three-state contract: `Invalid`
/// at catalog severity, `Unverified` as an advisory warning.
fn check_code(
    resolver: &dyn CodeListResolver,
    out: &mut Violations,
    list: &str,
    code: &str,
    path: String,
    what: &str,
) {
    match resolver.resolve(list, code) {
        CodeStatus::Valid => {}
        CodeStatus::Invalid => out.report(
            path,
            format!("{what} '{code}' is not in code list {list}"),
        ),
        CodeStatus::Unverified => out.advisory(
            path,
            format!("{what} '{code}' could not be verified against code list {list}"),
        ),
    }
}

fn type_code(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    check_code(
        resolver,
        out,
        lists::UNTDID_1001,
        invoice.type_code.code(),
        "Invoice.InvoiceTypeCode".into(),
        "invoice type code",
    );
}

fn document_currency(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    check_code(
        resolver,
        out,
        lists::ISO_4217,
        &invoice.currency_code,
        "Invoice.DocumentCurrencyCode".into(),
        "currency code",
    );
}

fn tax_currency(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    if let Some(code) = &invoice.tax_currency_code {
        check_code(
            resolver,
            out,
            lists::ISO_4217,
            code,
            "Invoice.TaxCurrencyCode".into(),
            "currency code",
        );
    }
}

fn address_countries(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    check_code(
        resolver,
        out,
        lists::ISO_3166,
        &invoice.supplier.address.country_code,
        "Invoice.AccountingSupplierParty.Party.PostalAddress.Country.IdentificationCode".into(),
        "country code",
    );
    check_code(
        resolver,
        out,
        lists::ISO_3166,
        &invoice.customer.address.country_code,
        "Invoice.AccountingCustomerParty.Party.PostalAddress.Country.IdentificationCode".into(),
        "country code",
    );
    // Optional parties may come without an address; an empty country
    // means the address was not given at all.
    if let Some(payee) = &invoice.payee {
        if !payee.address.country_code.is_empty() {
            check_code(
                resolver,
                out,
                lists::ISO_3166,
                &payee.address.country_code,
                "Invoice.PayeeParty.PostalAddress.Country.IdentificationCode".into(),
                "country code",
            );
        }
    }
    if let Some(representative) = &invoice.tax_representative {
        if !representative.address.country_code.is_empty() {
            check_code(
                resolver,
                out,
                lists::ISO_3166,
                &representative.address.country_code,
                "Invoice.TaxRepresentativeParty.PostalAddress.Country.IdentificationCode".into(),
                "country code",
            );
        }
    }
    if let Some(address) = invoice.delivery.as_ref().and_then(|d| d.address.as_ref()) {
        if !address.country_code.is_empty() {
            check_code(
                resolver,
                out,
                lists::ISO_3166,
                &address.country_code,
                "Invoice.Delivery.DeliveryLocation.Address.Country.IdentificationCode".into(),
                "country code",
            );
        }
    }
}

fn origin_countries(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, line) in invoice.lines.iter().enumerate() {
        if let Some(country) = &line.item.origin_country {
            check_code(
                resolver,
                out,
                lists::ISO_3166,
                country,
                format!("Invoice.InvoiceLine[{i}].Item.OriginCountry.IdentificationCode"),
                "country code",
            );
        }
    }
}

fn payment_means(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, means) in invoice.payment_means.iter().enumerate() {
        check_code(
            resolver,
            out,
            lists::UNTDID_4461,
            means.code.code(),
            format!("Invoice.PaymentMeans[{i}].PaymentMeansCode"),
            "payment means code",
        );
    }
}

fn tax_categories(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        if let Some(category) = &ac.tax_category {
            check_code(
                resolver,
                out,
                lists::UNTDID_5305,
                category.code.code(),
                format!("Invoice.AllowanceCharge[{i}].TaxCategory.ID"),
                "tax category code",
            );
        }
    }
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        for (j, sub) in total.subtotals.iter().enumerate() {
            check_code(
                resolver,
                out,
                lists::UNTDID_5305,
                sub.category.code.code(),
                format!("Invoice.TaxTotal[{i}].TaxSubtotal[{j}].TaxCategory.ID"),
                "tax category code",
            );
        }
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        check_code(
            resolver,
            out,
            lists::UNTDID_5305,
            line.item.tax_category.code.code(),
            format!("Invoice.InvoiceLine[{i}].Item.ClassifiedTaxCategory.ID"),
            "tax category code",
        );
    }
}

fn allowance_reasons(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (path, ac) in allowance_charges(invoice) {
        if ac.charge_indicator {
            continue;
        }
        if let Some(code) = &ac.reason_code {
            check_code(
                resolver,
                out,
                lists::UNTDID_5189,
                code,
                format!("{path}.AllowanceChargeReasonCode"),
                "allowance reason code",
            );
        }
    }
}

fn charge_reasons(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (path, ac) in allowance_charges(invoice) {
        if !ac.charge_indicator {
            continue;
        }
        if let Some(code) = &ac.reason_code {
            check_code(
                resolver,
                out,
                lists::UNTDID_7161,
                code,
                format!("{path}.AllowanceChargeReasonCode"),
                "charge reason code",
            );
        }
    }
}

fn unit_codes(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    for (i, line) in invoice.lines.iter().enumerate() {
        check_code(
            resolver,
            out,
            lists::UNECE_REC20,
            &line.quantity.unit_code,
            format!("Invoice.InvoiceLine[{i}].InvoicedQuantity"),
            "unit code",
        );
        if let Some(unit) = line
            .price
            .base_quantity
            .as_ref()
            .and_then(|b| b.unit_code.as_deref())
        {
            check_code(
                resolver,
                out,
                lists::UNECE_REC20,
                unit,
                format!("Invoice.InvoiceLine[{i}].Price.BaseQuantity"),
                "unit code",
            );
        }
    }
}

fn endpoint_schemes(invoice: &Invoice, resolver: &dyn CodeListResolver, out: &mut Violations) {
    if let Some(endpoint) = &invoice.supplier.endpoint {
        check_code(
            resolver,
            out,
            lists::EAS,
            &endpoint.scheme_id,
            "Invoice.AccountingSupplierParty.Party.EndpointID".into(),
            "electronic address scheme",
        );
    }
    if let Some(endpoint) = &invoice.customer.endpoint {
        check_code(
            resolver,
            out,
            lists::EAS,
            &endpoint.scheme_id,
            "Invoice.AccountingCustomerParty.Party.EndpointID".into(),
            "electronic address scheme",
        );
    }
}
