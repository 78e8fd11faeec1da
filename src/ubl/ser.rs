use crate::core::*;

use super::ubl_ns;
use super::xml_utils::{format_decimal, XmlResult, XmlWriter};

/// Generate Peppol BIS Billing 3.0 UBL 2.1 Invoice XML from an [`Invoice`].
///
/// Elements are emitted in the order the UBL schema sequences prescribe,
/// monetary amounts with exactly 2 fractional digits and a `currencyID`
/// attribute, dates as `YYYY-MM-DD`, booleans lowercase. Absent optional
/// fields (including empty strings) are omitted entirely. No business
/// validation runs here; the only failure besides an I/O fault is an
/// amount that cannot be stated in 2 fractional digits.
pub fn to_xml(invoice: &Invoice) -> XmlResult {
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "ubl:Invoice",
        &[
            ("xmlns:ubl", ubl_ns::INVOICE),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:cbc", ubl_ns::CBC),
        ],
    )?;

    // BT-24: Specification identifier
    w.text_element("cbc:CustomizationID", &invoice.customization_id)?;
    // BT-23: Business process type
    w.text_element("cbc:ProfileID", &invoice.profile_id)?;
    // BT-1: Invoice number
    w.text_element("cbc:ID", &invoice.id)?;
    // BT-2: Issue date
    w.text_element("cbc:IssueDate", &invoice.issue_date.to_string())?;
    // BT-9: Payment due date
    if let Some(due) = &invoice.due_date {
        w.text_element("cbc:DueDate", &due.to_string())?;
    }
    // BT-3: Invoice type code
    w.text_element("cbc:InvoiceTypeCode", invoice.type_code.code())?;
    // BT-22: Invoice notes
    for note in &invoice.notes {
        w.text_element("cbc:Note", note)?;
    }
    // BT-7: Value added tax point date
    if let Some(date) = &invoice.tax_point_date {
        w.text_element("cbc:TaxPointDate", &date.to_string())?;
    }
    // BT-5: Invoice currency code
    w.text_element("cbc:DocumentCurrencyCode", &invoice.currency_code)?;
    // BT-6: VAT accounting currency code
    if let Some(code) = non_empty(&invoice.tax_currency_code) {
        w.text_element("cbc:TaxCurrencyCode", code)?;
    }
    // BT-19: Buyer accounting reference
    if let Some(cost) = non_empty(&invoice.accounting_cost) {
        w.text_element("cbc:AccountingCost", cost)?;
    }
    // BT-10: Buyer reference
    if let Some(reference) = non_empty(&invoice.buyer_reference) {
        w.text_element("cbc:BuyerReference", reference)?;
    }

    // BG-14: Invoicing period
    if let Some(period) = &invoice.invoice_period {
        write_period(&mut w, period)?;
    }

    // BT-13/BT-14: Purchase order and sales order reference
    if let Some(order) = &invoice.order_reference {
        w.start_element("cac:OrderReference")?;
        w.text_element("cbc:ID", &order.id)?;
        if let Some(sales_order) = non_empty(&order.sales_order_id) {
            w.text_element("cbc:SalesOrderID", sales_order)?;
        }
        w.end_element("cac:OrderReference")?;
    }

    // BG-3: Preceding invoice references
    for reference in &invoice.billing_references {
        w.start_element("cac:BillingReference")?;
        w.start_element("cac:InvoiceDocumentReference")?;
        w.text_element("cbc:ID", &reference.id)?;
        if let Some(date) = &reference.issue_date {
            w.text_element("cbc:IssueDate", &date.to_string())?;
        }
        w.end_element("cac:InvoiceDocumentReference")?;
        w.end_element("cac:BillingReference")?;
    }

    // BT-16: Despatch advice reference
    if let Some(id) = non_empty(&invoice.despatch_document_reference) {
        write_id_reference(&mut w, "cac:DespatchDocumentReference", id)?;
    }
    // BT-15: Receiving advice reference
    if let Some(id) = non_empty(&invoice.receipt_document_reference) {
        write_id_reference(&mut w, "cac:ReceiptDocumentReference", id)?;
    }
    // BT-17: Tender or lot reference
    if let Some(id) = non_empty(&invoice.originator_document_reference) {
        write_id_reference(&mut w, "cac:OriginatorDocumentReference", id)?;
    }
    // BT-12: Contract reference
    if let Some(id) = non_empty(&invoice.contract_document_reference) {
        write_id_reference(&mut w, "cac:ContractDocumentReference", id)?;
    }

    // BG-24: Additional supporting documents
    for reference in &invoice.additional_document_references {
        write_document_reference(&mut w, reference)?;
    }

    // BT-11: Project reference
    if let Some(id) = non_empty(&invoice.project_reference) {
        write_id_reference(&mut w, "cac:ProjectReference", id)?;
    }

    // BG-4: Seller
    write_party(&mut w, &invoice.supplier, "cac:AccountingSupplierParty", true)?;
    // BG-7: Buyer
    write_party(&mut w, &invoice.customer, "cac:AccountingCustomerParty", true)?;
    // BG-10: Payee
    if let Some(payee) = &invoice.payee {
        write_party(&mut w, payee, "cac:PayeeParty", false)?;
    }
    // BG-11: Seller tax representative
    if let Some(representative) = &invoice.tax_representative {
        write_party(&mut w, representative, "cac:TaxRepresentativeParty", false)?;
    }

    // BG-13: Delivery information
    if let Some(delivery) = &invoice.delivery {
        write_delivery(&mut w, delivery)?;
    }

    // BG-16: Payment instructions
    for means in &invoice.payment_means {
        write_payment_means(&mut w, means)?;
    }

    // BT-20: Payment terms
    if let Some(terms) = &invoice.payment_terms {
        if !terms.note.is_empty() {
            w.start_element("cac:PaymentTerms")?;
            w.text_element("cbc:Note", &terms.note)?;
            w.end_element("cac:PaymentTerms")?;
        }
    }

    // BG-20/BG-21: Document level allowances and charges
    for (i, ac) in invoice.allowance_charges.iter().enumerate() {
        let path = format!("Invoice.AllowanceCharge[{i}]");
        write_allowance_charge(&mut w, ac, &path)?;
    }

    // BG-22/BG-23: Tax totals with the VAT breakdown
    for (i, total) in invoice.tax_totals.iter().enumerate() {
        write_tax_total(&mut w, total, i)?;
    }

    // BG-22: Document totals
    write_monetary_total(&mut w, &invoice.monetary_total)?;

    // BG-25: Invoice lines
    for (i, line) in invoice.lines.iter().enumerate() {
        write_line(&mut w, line, i)?;
    }

    w.end_element("ubl:Invoice")?;
    w.into_string()
}

/// Empty strings count as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn write_id_reference(w: &mut XmlWriter, wrapper: &str, id: &str) -> Result<(), StructuralError> {
    w.start_element(wrapper)?;
    w.text_element("cbc:ID", id)?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_period(w: &mut XmlWriter, period: &Period) -> Result<(), StructuralError> {
    w.start_element("cac:InvoicePeriod")?;
    if let Some(start) = &period.start_date {
        w.text_element("cbc:StartDate", &start.to_string())?;
    }
    if let Some(end) = &period.end_date {
        w.text_element("cbc:EndDate", &end.to_string())?;
    }
    if let Some(code) = non_empty(&period.description_code) {
        w.text_element("cbc:DescriptionCode", code)?;
    }
    w.end_element("cac:InvoicePeriod")?;
    Ok(())
}

fn write_document_reference(
    w: &mut XmlWriter,
    reference: &AdditionalDocumentReference,
) -> Result<(), StructuralError> {
    w.start_element("cac:AdditionalDocumentReference")?;
    match non_empty(&reference.scheme_id) {
        Some(scheme) => {
            w.text_element_with_attrs("cbc:ID", &reference.id, &[("schemeID", scheme)])?
        }
        None => w.text_element("cbc:ID", &reference.id)?,
    };
    if let Some(code) = non_empty(&reference.document_type_code) {
        w.text_element("cbc:DocumentTypeCode", code)?;
    }
    if let Some(description) = non_empty(&reference.description) {
        w.text_element("cbc:DocumentDescription", description)?;
    }
    if reference.attachment.is_some() || non_empty(&reference.external_uri).is_some() {
        w.start_element("cac:Attachment")?;
        if let Some(attachment) = &reference.attachment {
            w.text_element_with_attrs(
                "cbc:EmbeddedDocumentBinaryObject",
                &attachment.content,
                &[
                    ("mimeCode", attachment.mime_code.as_str()),
                    ("filename", attachment.filename.as_str()),
                ],
            )?;
        }
        if let Some(uri) = non_empty(&reference.external_uri) {
            w.start_element("cac:ExternalReference")?;
            w.text_element("cbc:URI", uri)?;
            w.end_element("cac:ExternalReference")?;
        }
        w.end_element("cac:Attachment")?;
    }
    w.end_element("cac:AdditionalDocumentReference")?;
    Ok(())
}

fn write_party(
    w: &mut XmlWriter,
    party: &Party,
    wrapper: &str,
    nested: bool,
) -> Result<(), StructuralError> {
    w.start_element(wrapper)?;
    if nested {
        w.start_element("cac:Party")?;
    }

    // BT-34/BT-49: Electronic address
    if let Some(endpoint) = &party.endpoint {
        w.text_element_with_attrs(
            "cbc:EndpointID",
            &endpoint.value,
            &[("schemeID", endpoint.scheme_id.as_str())],
        )?;
    }

    // BT-29/BT-46/BT-60: Party identifiers
    for identifier in &party.identifications {
        w.start_element("cac:PartyIdentification")?;
        write_identifier(w, "cbc:ID", identifier)?;
        w.end_element("cac:PartyIdentification")?;
    }

    // BT-28/BT-45: Trading name
    if !party.name.is_empty() {
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", &party.name)?;
        w.end_element("cac:PartyName")?;
    }

    // BG-5/BG-8: Postal address
    if !party.address.country_code.is_empty() {
        w.start_element("cac:PostalAddress")?;
        write_address(w, &party.address)?;
        w.end_element("cac:PostalAddress")?;
    }

    // BT-31/BT-32/BT-48: Tax registrations
    for registration in &party.tax_registrations {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", &registration.company_id)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", registration.scheme.code())?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:PartyTaxScheme")?;
    }

    // BT-27/BT-44: Legal registration
    if !party.legal_entity.registration_name.is_empty() {
        w.start_element("cac:PartyLegalEntity")?;
        w.text_element("cbc:RegistrationName", &party.legal_entity.registration_name)?;
        if let Some(company_id) = &party.legal_entity.company_id {
            write_identifier(w, "cbc:CompanyID", company_id)?;
        }
        if let Some(form) = non_empty(&party.legal_entity.company_legal_form) {
            w.text_element("cbc:CompanyLegalForm", form)?;
        }
        w.end_element("cac:PartyLegalEntity")?;
    }

    // BG-6/BG-9: Contact
    if let Some(contact) = &party.contact {
        w.start_element("cac:Contact")?;
        if let Some(name) = non_empty(&contact.name) {
            w.text_element("cbc:Name", name)?;
        }
        if let Some(telephone) = non_empty(&contact.telephone) {
            w.text_element("cbc:Telephone", telephone)?;
        }
        if let Some(email) = non_empty(&contact.email) {
            w.text_element("cbc:ElectronicMail", email)?;
        }
        w.end_element("cac:Contact")?;
    }

    if nested {
        w.end_element("cac:Party")?;
    }
    w.end_element(wrapper)?;
    Ok(())
}

fn write_identifier(
    w: &mut XmlWriter,
    name: &str,
    identifier: &Identifier,
) -> Result<(), StructuralError> {
    match identifier.scheme_id.as_deref().filter(|s| !s.is_empty()) {
        Some(scheme) => w.text_element_with_attrs(name, &identifier.value, &[("schemeID", scheme)])?,
        None => w.text_element(name, &identifier.value)?,
    };
    Ok(())
}

fn write_address(w: &mut XmlWriter, address: &Address) -> Result<(), StructuralError> {
    if let Some(street) = non_empty(&address.street) {
        w.text_element("cbc:StreetName", street)?;
    }
    if let Some(additional) = non_empty(&address.additional_street) {
        w.text_element("cbc:AdditionalStreetName", additional)?;
    }
    if let Some(city) = non_empty(&address.city) {
        w.text_element("cbc:CityName", city)?;
    }
    if let Some(zone) = non_empty(&address.postal_zone) {
        w.text_element("cbc:PostalZone", zone)?;
    }
    if let Some(subentity) = non_empty(&address.country_subentity) {
        w.text_element("cbc:CountrySubentity", subentity)?;
    }
    if let Some(line) = non_empty(&address.address_line) {
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", line)?;
        w.end_element("cac:AddressLine")?;
    }
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &address.country_code)?;
    w.end_element("cac:Country")?;
    Ok(())
}

fn write_delivery(w: &mut XmlWriter, delivery: &Delivery) -> Result<(), StructuralError> {
    w.start_element("cac:Delivery")?;
    // BT-72: Actual delivery date
    if let Some(date) = &delivery.actual_delivery_date {
        w.text_element("cbc:ActualDeliveryDate", &date.to_string())?;
    }
    // BT-71: Delivery location identifier, BG-15: delivery address
    if delivery.location_id.is_some() || delivery.address.is_some() {
        w.start_element("cac:DeliveryLocation")?;
        if let Some(identifier) = &delivery.location_id {
            write_identifier(w, "cbc:ID", identifier)?;
        }
        if let Some(address) = &delivery.address {
            w.start_element("cac:Address")?;
            write_address(w, address)?;
            w.end_element("cac:Address")?;
        }
        w.end_element("cac:DeliveryLocation")?;
    }
    // BT-70: Deliver-to party name
    if let Some(name) = non_empty(&delivery.party_name) {
        w.start_element("cac:DeliveryParty")?;
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", name)?;
        w.end_element("cac:PartyName")?;
        w.end_element("cac:DeliveryParty")?;
    }
    w.end_element("cac:Delivery")?;
    Ok(())
}

fn write_payment_means(w: &mut XmlWriter, means: &PaymentMeans) -> Result<(), StructuralError> {
    w.start_element("cac:PaymentMeans")?;
    // BT-81/BT-82: Payment means code with optional text
    match non_empty(&means.name) {
        Some(name) => {
            w.text_element_with_attrs("cbc:PaymentMeansCode", means.code.code(), &[("name", name)])?
        }
        None => w.text_element("cbc:PaymentMeansCode", means.code.code())?,
    };
    // BT-83: Remittance information
    if let Some(payment_id) = non_empty(&means.payment_id) {
        w.text_element("cbc:PaymentID", payment_id)?;
    }
    // BG-18: Payment card information
    if let Some(card) = &means.card_account {
        w.start_element("cac:CardAccount")?;
        w.text_element("cbc:PrimaryAccountNumberID", &card.primary_account_number)?;
        w.text_element("cbc:NetworkID", &card.network_id)?;
        if let Some(holder) = non_empty(&card.holder_name) {
            w.text_element("cbc:HolderName", holder)?;
        }
        w.end_element("cac:CardAccount")?;
    }
    // BG-17: Credit transfer account
    if let Some(account) = &means.payee_account {
        w.start_element("cac:PayeeFinancialAccount")?;
        w.text_element("cbc:ID", &account.id)?;
        if let Some(name) = non_empty(&account.name) {
            w.text_element("cbc:Name", name)?;
        }
        if let Some(branch) = non_empty(&account.institution_branch_id) {
            w.start_element("cac:FinancialInstitutionBranch")?;
            w.text_element("cbc:ID", branch)?;
            w.end_element("cac:FinancialInstitutionBranch")?;
        }
        w.end_element("cac:PayeeFinancialAccount")?;
    }
    // BG-19: Direct debit mandate
    if let Some(mandate) = &means.mandate {
        w.start_element("cac:PaymentMandate")?;
        if let Some(id) = non_empty(&mandate.id) {
            w.text_element("cbc:ID", id)?;
        }
        if let Some(account) = non_empty(&mandate.payer_account_id) {
            w.start_element("cac:PayerFinancialAccount")?;
            w.text_element("cbc:ID", account)?;
            w.end_element("cac:PayerFinancialAccount")?;
        }
        w.end_element("cac:PaymentMandate")?;
    }
    w.end_element("cac:PaymentMeans")?;
    Ok(())
}

fn write_allowance_charge(
    w: &mut XmlWriter,
    ac: &AllowanceCharge,
    path: &str,
) -> Result<(), StructuralError> {
    w.start_element("cac:AllowanceCharge")?;
    w.text_element(
        "cbc:ChargeIndicator",
        if ac.charge_indicator { "true" } else { "false" },
    )?;
    if let Some(code) = non_empty(&ac.reason_code) {
        w.text_element("cbc:AllowanceChargeReasonCode", code)?;
    }
    if let Some(reason) = non_empty(&ac.reason) {
        w.text_element("cbc:AllowanceChargeReason", reason)?;
    }
    if let Some(factor) = &ac.multiplier_factor {
        w.text_element("cbc:MultiplierFactorNumeric", &format_decimal(*factor))?;
    }
    w.amount_element("cbc:Amount", &ac.amount, &format!("{path}.Amount"))?;
    if let Some(base) = &ac.base_amount {
        w.amount_element("cbc:BaseAmount", base, &format!("{path}.BaseAmount"))?;
    }
    if let Some(category) = &ac.tax_category {
        w.start_element("cac:TaxCategory")?;
        w.text_element("cbc:ID", category.code.code())?;
        if let Some(percent) = &category.percent {
            w.text_element("cbc:Percent", &format_decimal(*percent))?;
        }
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:TaxCategory")?;
    }
    w.end_element("cac:AllowanceCharge")?;
    Ok(())
}

fn write_tax_total(w: &mut XmlWriter, total: &TaxTotal, index: usize) -> Result<(), StructuralError> {
    w.start_element("cac:TaxTotal")?;
    w.amount_element(
        "cbc:TaxAmount",
        &total.tax_amount,
        &format!("Invoice.TaxTotal[{index}].TaxAmount"),
    )?;
    for (j, sub) in total.subtotals.iter().enumerate() {
        let path = format!("Invoice.TaxTotal[{index}].TaxSubtotal[{j}]");
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element(
            "cbc:TaxableAmount",
            &sub.taxable_amount,
            &format!("{path}.TaxableAmount"),
        )?;
        w.amount_element("cbc:TaxAmount", &sub.tax_amount, &format!("{path}.TaxAmount"))?;
        w.start_element("cac:TaxCategory")?;
        w.text_element("cbc:ID", sub.category.code.code())?;
        if let Some(percent) = &sub.category.percent {
            w.text_element("cbc:Percent", &format_decimal(*percent))?;
        }
        if let Some(code) = non_empty(&sub.exemption_reason_code) {
            w.text_element("cbc:TaxExemptionReasonCode", code)?;
        }
        if let Some(reason) = non_empty(&sub.exemption_reason) {
            w.text_element("cbc:TaxExemptionReason", reason)?;
        }
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:TaxCategory")?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;
    Ok(())
}

fn write_monetary_total(w: &mut XmlWriter, totals: &MonetaryTotal) -> Result<(), StructuralError> {
    const BASE: &str = "Invoice.LegalMonetaryTotal";
    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element(
        "cbc:LineExtensionAmount",
        &totals.line_extension_amount,
        &format!("{BASE}.LineExtensionAmount"),
    )?;
    w.amount_element(
        "cbc:TaxExclusiveAmount",
        &totals.tax_exclusive_amount,
        &format!("{BASE}.TaxExclusiveAmount"),
    )?;
    w.amount_element(
        "cbc:TaxInclusiveAmount",
        &totals.tax_inclusive_amount,
        &format!("{BASE}.TaxInclusiveAmount"),
    )?;
    if let Some(allowance) = &totals.allowance_total_amount {
        w.amount_element(
            "cbc:AllowanceTotalAmount",
            allowance,
            &format!("{BASE}.AllowanceTotalAmount"),
        )?;
    }
    if let Some(charge) = &totals.charge_total_amount {
        w.amount_element(
            "cbc:ChargeTotalAmount",
            charge,
            &format!("{BASE}.ChargeTotalAmount"),
        )?;
    }
    if let Some(prepaid) = &totals.prepaid_amount {
        w.amount_element("cbc:PrepaidAmount", prepaid, &format!("{BASE}.PrepaidAmount"))?;
    }
    if let Some(rounding) = &totals.payable_rounding_amount {
        w.amount_element(
            "cbc:PayableRoundingAmount",
            rounding,
            &format!("{BASE}.PayableRoundingAmount"),
        )?;
    }
    w.amount_element(
        "cbc:PayableAmount",
        &totals.payable_amount,
        &format!("{BASE}.PayableAmount"),
    )?;
    w.end_element("cac:LegalMonetaryTotal")?;
    Ok(())
}

fn write_line(w: &mut XmlWriter, line: &InvoiceLine, index: usize) -> Result<(), StructuralError> {
    let path = format!("Invoice.InvoiceLine[{index}]");
    w.start_element("cac:InvoiceLine")?;
    // BT-126: Line identifier
    w.text_element("cbc:ID", &line.id)?;
    // BT-127: Line note
    if let Some(note) = non_empty(&line.note) {
        w.text_element("cbc:Note", note)?;
    }
    // BT-129/BT-130: Invoiced quantity
    w.quantity_element(
        "cbc:InvoicedQuantity",
        line.quantity.value,
        &line.quantity.unit_code,
    )?;
    // BT-131: Line net amount
    w.amount_element(
        "cbc:LineExtensionAmount",
        &line.line_extension_amount,
        &format!("{path}.LineExtensionAmount"),
    )?;
    // BT-133: Line accounting reference
    if let Some(cost) = non_empty(&line.accounting_cost) {
        w.text_element("cbc:AccountingCost", cost)?;
    }
    // BG-26: Line invoicing period
    if let Some(period) = &line.period {
        write_period(w, period)?;
    }
    // BT-132: Referenced purchase order line
    if let Some(order_line) = non_empty(&line.order_line_id) {
        w.start_element("cac:OrderLineReference")?;
        w.text_element("cbc:LineID", order_line)?;
        w.end_element("cac:OrderLineReference")?;
    }
    // BT-128: Invoiced object identifier
    if let Some(object) = &line.object_identifier {
        w.start_element("cac:DocumentReference")?;
        write_identifier(w, "cbc:ID", object)?;
        w.text_element("cbc:DocumentTypeCode", "130")?;
        w.end_element("cac:DocumentReference")?;
    }
    // BG-27/BG-28: Line allowances and charges
    for (j, ac) in line.allowance_charges.iter().enumerate() {
        write_allowance_charge(w, ac, &format!("{path}.AllowanceCharge[{j}]"))?;
    }

    // BG-31: Item information
    w.start_element("cac:Item")?;
    if let Some(description) = non_empty(&line.item.description) {
        w.text_element("cbc:Description", description)?;
    }
    w.text_element("cbc:Name", &line.item.name)?;
    if let Some(id) = non_empty(&line.item.buyers_id) {
        w.start_element("cac:BuyersItemIdentification")?;
        w.text_element("cbc:ID", id)?;
        w.end_element("cac:BuyersItemIdentification")?;
    }
    if let Some(id) = non_empty(&line.item.sellers_id) {
        w.start_element("cac:SellersItemIdentification")?;
        w.text_element("cbc:ID", id)?;
        w.end_element("cac:SellersItemIdentification")?;
    }
    if let Some(identifier) = &line.item.standard_id {
        w.start_element("cac:StandardItemIdentification")?;
        write_identifier(w, "cbc:ID", identifier)?;
        w.end_element("cac:StandardItemIdentification")?;
    }
    // BT-159: Item country of origin
    if let Some(country) = non_empty(&line.item.origin_country) {
        w.start_element("cac:OriginCountry")?;
        w.text_element("cbc:IdentificationCode", country)?;
        w.end_element("cac:OriginCountry")?;
    }
    // BT-158: Item classifications
    for classification in &line.item.classifications {
        w.start_element("cac:CommodityClassification")?;
        let mut attrs = vec![("listID", classification.list_id.as_str())];
        if let Some(version) = non_empty(&classification.list_version_id) {
            attrs.push(("listVersionID", version));
        }
        w.text_element_with_attrs("cbc:ItemClassificationCode", &classification.code, &attrs)?;
        w.end_element("cac:CommodityClassification")?;
    }
    // BT-151/BT-152: Line VAT category
    w.start_element("cac:ClassifiedTaxCategory")?;
    w.text_element("cbc:ID", line.item.tax_category.code.code())?;
    if let Some(percent) = &line.item.tax_category.percent {
        w.text_element("cbc:Percent", &format_decimal(*percent))?;
    }
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element("cac:ClassifiedTaxCategory")?;
    // BG-32: Item attributes
    for property in &line.item.properties {
        w.start_element("cac:AdditionalItemProperty")?;
        w.text_element("cbc:Name", &property.name)?;
        w.text_element("cbc:Value", &property.value)?;
        w.end_element("cac:AdditionalItemProperty")?;
    }
    w.end_element("cac:Item")?;

    // BG-29: Price details
    w.start_element("cac:Price")?;
    w.price_element("cbc:PriceAmount", &line.price.amount)?;
    if let Some(base) = &line.price.base_quantity {
        match &base.unit_code {
            Some(unit) => w.quantity_element("cbc:BaseQuantity", base.value, unit)?,
            None => w.text_element("cbc:BaseQuantity", &format_decimal(base.value))?,
        };
    }
    // BT-147/BT-148: Price discount with its gross base
    if let Some(allowance) = &line.price.allowance {
        w.start_element("cac:AllowanceCharge")?;
        w.text_element("cbc:ChargeIndicator", "false")?;
        w.price_element("cbc:Amount", &allowance.amount)?;
        if let Some(base) = &allowance.base_amount {
            w.price_element("cbc:BaseAmount", base)?;
        }
        w.end_element("cac:AllowanceCharge")?;
    }
    w.end_element("cac:Price")?;

    w.end_element("cac:InvoiceLine")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::core::{AddressBuilder, InvoiceBuilder, LineBuilder, PartyBuilder};

    fn sample() -> Invoice {
        InvoiceBuilder::new("INV-100", NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
            .due_date(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap())
            .buyer_reference("REF-7")
            .supplier(
                PartyBuilder::new(
                    "Acme GmbH",
                    AddressBuilder::new("Berlin", "10115", "DE").build(),
                )
                .endpoint("9930", "DE123456789")
                .vat_id("DE123456789")
                .build(),
            )
            .customer(
                PartyBuilder::new(
                    "Kunde AG",
                    AddressBuilder::new("Wien", "1010", "AT").build(),
                )
                .endpoint("9914", "ATU12345678")
                .build(),
            )
            .add_line(
                LineBuilder::new("1", "Widget", dec!(4), "C62", dec!(25.00))
                    .tax(TaxCategoryCode::StandardRate, dec!(20))
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn root_carries_namespaces() {
        let xml = to_xml(&sample()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "xmlns:ubl=\"urn:oasis:names:specification:ubl:schema:xsd:Invoice-2\""
        ));
        assert!(xml.contains("<ubl:Invoice"));
        assert!(xml.contains("</ubl:Invoice>"));
    }

    #[test]
    fn amounts_carry_currency_and_two_decimals() {
        let xml = to_xml(&sample()).unwrap();
        assert!(xml.contains(r#"<cbc:LineExtensionAmount currencyID="EUR">100.00</cbc:LineExtensionAmount>"#));
        assert!(xml.contains(r#"<cbc:TaxAmount currencyID="EUR">20.00</cbc:TaxAmount>"#));
        assert!(xml.contains(r#"<cbc:PayableAmount currencyID="EUR">120.00</cbc:PayableAmount>"#));
    }

    #[test]
    fn quantities_carry_unit_codes() {
        let xml = to_xml(&sample()).unwrap();
        assert!(xml.contains(r#"<cbc:InvoicedQuantity unitCode="C62">4.00</cbc:InvoicedQuantity>"#));
    }

    #[test]
    fn absent_fields_are_omitted() {
        let xml = to_xml(&sample()).unwrap();
        assert!(!xml.contains("cbc:TaxCurrencyCode"));
        assert!(!xml.contains("cac:OrderReference"));
        assert!(!xml.contains("cbc:PrepaidAmount"));
        assert!(!xml.contains("cac:Delivery"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let mut invoice = sample();
        invoice.buyer_reference = Some(String::new());
        invoice.accounting_cost = Some(String::new());
        let xml = to_xml(&invoice).unwrap();
        assert!(!xml.contains("cbc:BuyerReference"));
        assert!(!xml.contains("cbc:AccountingCost"));
    }

    #[test]
    fn element_order_follows_the_schema() {
        let xml = to_xml(&sample()).unwrap();
        let pos = |needle: &str| xml.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(pos("cbc:CustomizationID") < pos("cbc:ProfileID"));
        assert!(pos("cbc:ProfileID") < pos("<cbc:ID>"));
        assert!(pos("cbc:IssueDate") < pos("cbc:DueDate"));
        assert!(pos("cbc:InvoiceTypeCode") < pos("cbc:DocumentCurrencyCode"));
        assert!(pos("cac:AccountingSupplierParty") < pos("cac:AccountingCustomerParty"));
        assert!(pos("cac:AccountingCustomerParty") < pos("cac:TaxTotal"));
        assert!(pos("cac:TaxTotal") < pos("cac:LegalMonetaryTotal"));
        assert!(pos("cac:LegalMonetaryTotal") < pos("cac:InvoiceLine"));
    }

    #[test]
    fn oversized_scale_aborts_with_data_integrity_error() {
        let mut invoice = sample();
        invoice.monetary_total.payable_amount.value = dec!(120.005);
        let err = to_xml(&invoice).unwrap_err();
        match err {
            StructuralError::AmountScale { path, .. } => {
                assert_eq!(path, "Invoice.LegalMonetaryTotal.PayableAmount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serialization_never_validates() {
        // A document violating business rules (no due date, nothing
        // identifying the buyer) still serializes.
        let mut invoice = sample();
        invoice.due_date = None;
        invoice.buyer_reference = None;
        invoice.customer.endpoint = None;
        let xml = to_xml(&invoice).unwrap();
        assert!(xml.contains("<cbc:ID>INV-100</cbc:ID>"));
    }

    #[test]
    fn price_keeps_full_precision() {
        let mut invoice = sample();
        invoice.lines[0].price.amount.value = dec!(0.1235);
        let xml = to_xml(&invoice).unwrap();
        assert!(xml.contains(r#"<cbc:PriceAmount currencyID="EUR">0.1235</cbc:PriceAmount>"#));
    }
}
