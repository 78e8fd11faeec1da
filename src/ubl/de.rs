use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rust_decimal::Decimal;

use crate::core::*;

/// Parse UBL 2.1 Invoice XML into an [`Invoice`].
///
/// Matching is prefix-insensitive: elements are recognized by local name, so
/// `cbc:ID`, `ID` and `ns0:ID` are all the same element. Unknown elements and
/// attributes are skipped. Errors are raised only for structural defects:
/// malformed XML, a non-Invoice root, missing required elements or
/// attributes, singleton elements occurring twice, unparseable decimals or
/// dates, and totals carrying more than 2 fractional digits. On error no
/// partial model is returned.
pub fn from_xml(xml: &str) -> Result<Invoice, StructuralError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut acc = InvoiceAcc::default();
    let mut path: Vec<String> = Vec::new();
    let mut pending = PendingAttrs::default();
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref())?;
                if path.is_empty() {
                    if name != "Invoice" {
                        return Err(StructuralError::UnexpectedRoot(name));
                    }
                    seen_root = true;
                }
                pending = PendingAttrs::capture(&e);
                acc.enter(&path, &name);
                path.push(name);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| StructuralError::Xml(err.to_string()))?;
                if !text.is_empty() && !path.is_empty() {
                    acc.handle_text(&path, &mut pending, &text)?;
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = path.pop() {
                    acc.leave(&path, &name)?;
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.name().as_ref())?;
                if path.is_empty() {
                    if name != "Invoice" {
                        return Err(StructuralError::UnexpectedRoot(name));
                    }
                    seen_root = true;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(StructuralError::Xml(e.to_string())),
        }
    }

    if !seen_root {
        return Err(StructuralError::MissingElement {
            path: "Invoice".into(),
        });
    }
    acc.finish()
}

/// Element name with any namespace prefix stripped.
fn local_name(raw: &[u8]) -> Result<String, StructuralError> {
    let name = std::str::from_utf8(raw).map_err(|_| StructuralError::Encoding)?;
    Ok(name.rsplit(':').next().unwrap_or(name).to_string())
}

/// Store a singleton value, rejecting a second occurrence.
fn set_once<T>(slot: &mut Option<T>, value: T, path: &str) -> Result<(), StructuralError> {
    if slot.is_some() {
        return Err(StructuralError::Cardinality {
            path: path.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn required<T>(slot: Option<T>, path: &str) -> Result<T, StructuralError> {
    slot.ok_or_else(|| StructuralError::MissingElement {
        path: path.to_string(),
    })
}

fn parse_date(path: &str, text: &str) -> Result<NaiveDate, StructuralError> {
    if text.len() == 10 {
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    Err(StructuralError::InvalidDate {
        path: path.to_string(),
        value: text.to_string(),
    })
}

fn parse_decimal(path: &str, text: &str) -> Result<Decimal, StructuralError> {
    text.parse::<Decimal>()
        .map_err(|_| StructuralError::InvalidDecimal {
            path: path.to_string(),
            value: text.to_string(),
        })
}

/// An amount with its mandatory `currencyID`; unit prices, any scale.
fn parse_amount(
    path: &str,
    text: &str,
    pending: &mut PendingAttrs,
) -> Result<MonetaryAmount, StructuralError> {
    let value = parse_decimal(path, text)?;
    let currency = pending
        .currency_id
        .take()
        .ok_or_else(|| StructuralError::MissingAttribute {
            path: path.to_string(),
            attribute: "currencyID".to_string(),
        })?;
    Ok(MonetaryAmount { value, currency })
}

/// An amount constrained to at most 2 fractional digits (totals, line
/// extensions, tax amounts, allowance and charge amounts).
fn parse_strict_amount(
    path: &str,
    text: &str,
    pending: &mut PendingAttrs,
) -> Result<MonetaryAmount, StructuralError> {
    let amount = parse_amount(path, text, pending)?;
    if !amount.has_standard_scale() {
        return Err(StructuralError::AmountScale {
            path: path.to_string(),
            value: text.to_string(),
        });
    }
    Ok(amount)
}

/// Attributes captured at the opening tag, consumed by the text handler of
/// the same element.
#[derive(Default)]
struct PendingAttrs {
    currency_id: Option<String>,
    unit_code: Option<String>,
    scheme_id: Option<String>,
    name: Option<String>,
    mime_code: Option<String>,
    filename: Option<String>,
    list_id: Option<String>,
    list_version_id: Option<String>,
}

impl PendingAttrs {
    fn capture(e: &BytesStart) -> Self {
        let mut attrs = Self::default();
        for attr in e.attributes().flatten() {
            let Ok(value) = std::str::from_utf8(&attr.value) else {
                continue;
            };
            match attr.key.as_ref() {
                b"currencyID" => attrs.currency_id = Some(value.to_string()),
                b"unitCode" => attrs.unit_code = Some(value.to_string()),
                b"schemeID" => attrs.scheme_id = Some(value.to_string()),
                b"name" => attrs.name = Some(value.to_string()),
                b"mimeCode" => attrs.mime_code = Some(value.to_string()),
                b"filename" => attrs.filename = Some(value.to_string()),
                b"listID" => attrs.list_id = Some(value.to_string()),
                b"listVersionID" => attrs.list_version_id = Some(value.to_string()),
                _ => {}
            }
        }
        attrs
    }
}

/// Document under construction. Scalars land directly; repeatable structures
/// go through a `current_*` accumulator that is flushed when its container
/// element closes.
#[derive(Default)]
struct InvoiceAcc {
    customization_id: Option<String>,
    profile_id: Option<String>,
    id: Option<String>,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    type_code: Option<String>,
    notes: Vec<String>,
    tax_point_date: Option<NaiveDate>,
    currency_code: Option<String>,
    tax_currency_code: Option<String>,
    accounting_cost: Option<String>,
    buyer_reference: Option<String>,
    invoice_period: Option<PeriodAcc>,
    order_id: Option<String>,
    sales_order_id: Option<String>,
    billing_references: Vec<BillingReference>,
    current_billing: Option<BillingAcc>,
    despatch_document_reference: Option<String>,
    receipt_document_reference: Option<String>,
    originator_document_reference: Option<String>,
    contract_document_reference: Option<String>,
    additional_document_references: Vec<AdditionalDocumentReference>,
    current_document_reference: Option<DocumentReferenceAcc>,
    project_reference: Option<String>,
    supplier: PartyAcc,
    customer: PartyAcc,
    payee: Option<PartyAcc>,
    tax_representative: Option<PartyAcc>,
    delivery: Option<DeliveryAcc>,
    payment_means: Vec<PaymentMeans>,
    current_payment_means: Option<PaymentMeansAcc>,
    payment_terms_note: Option<String>,
    allowance_charges: Vec<AllowanceCharge>,
    current_allowance: Option<AllowanceChargeAcc>,
    tax_totals: Vec<TaxTotal>,
    current_tax_total: Option<TaxTotalAcc>,
    totals: TotalsAcc,
    lines: Vec<InvoiceLine>,
    current_line: Option<LineAcc>,
}

impl InvoiceAcc {
    /// Open accumulators for repeatable containers. `path` holds the
    /// ancestors of the element being entered.
    fn enter(&mut self, path: &[String], name: &str) {
        let at_root = path.len() == 1;
        match name {
            "InvoiceLine" if at_root => {
                self.current_line = Some(LineAcc::new(self.lines.len()));
            }
            "TaxTotal" if at_root => {
                self.current_tax_total = Some(TaxTotalAcc::new(self.tax_totals.len()));
            }
            "TaxSubtotal" => {
                if let Some(total) = self.current_tax_total.as_mut() {
                    total.current_subtotal =
                        Some(SubtotalAcc::new(&total.base, total.subtotals.len()));
                }
            }
            "AllowanceCharge" => {
                if path.last().is_some_and(|p| p == "InvoiceLine") {
                    if let Some(line) = self.current_line.as_mut() {
                        let base = format!(
                            "{}.AllowanceCharge[{}]",
                            line.base,
                            line.allowance_charges.len()
                        );
                        line.current_allowance = Some(AllowanceChargeAcc::new(base));
                    }
                } else if at_root {
                    let base = format!("Invoice.AllowanceCharge[{}]", self.allowance_charges.len());
                    self.current_allowance = Some(AllowanceChargeAcc::new(base));
                }
                // Price-level allowances have fixed children and are folded
                // straight into the line accumulator.
            }
            "BillingReference" if at_root => {
                self.current_billing = Some(BillingAcc::new(self.billing_references.len()));
            }
            "AdditionalDocumentReference" if at_root => {
                self.current_document_reference = Some(DocumentReferenceAcc::new(
                    self.additional_document_references.len(),
                ));
            }
            "PaymentMeans" if at_root => {
                self.current_payment_means = Some(PaymentMeansAcc::new(self.payment_means.len()));
            }
            _ => {}
        }
    }

    /// Flush accumulators when their container closes. `path` holds the
    /// ancestors of the element just left.
    fn leave(&mut self, path: &[String], name: &str) -> Result<(), StructuralError> {
        let at_root = path.len() == 1;
        match name {
            "InvoiceLine" if at_root => {
                if let Some(line) = self.current_line.take() {
                    self.lines.push(line.finish()?);
                }
            }
            "TaxSubtotal" => {
                if let Some(total) = self.current_tax_total.as_mut() {
                    if let Some(sub) = total.current_subtotal.take() {
                        total.subtotals.push(sub.finish()?);
                    }
                }
            }
            "TaxTotal" if at_root => {
                if let Some(total) = self.current_tax_total.take() {
                    self.tax_totals.push(total.finish()?);
                }
            }
            "AllowanceCharge" => {
                if path.last().is_some_and(|p| p == "InvoiceLine") {
                    if let Some(line) = self.current_line.as_mut() {
                        if let Some(ac) = line.current_allowance.take() {
                            line.allowance_charges.push(ac.finish()?);
                        }
                    }
                } else if at_root {
                    if let Some(ac) = self.current_allowance.take() {
                        self.allowance_charges.push(ac.finish()?);
                    }
                }
            }
            "BillingReference" if at_root => {
                if let Some(billing) = self.current_billing.take() {
                    self.billing_references.push(billing.finish()?);
                }
            }
            "AdditionalDocumentReference" if at_root => {
                if let Some(reference) = self.current_document_reference.take() {
                    self.additional_document_references.push(reference.finish()?);
                }
            }
            "PaymentMeans" if at_root => {
                if let Some(means) = self.current_payment_means.take() {
                    self.payment_means.push(means.finish()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_text(
        &mut self,
        path: &[String],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        let rel: Vec<&str> = path[1..].iter().map(String::as_str).collect();
        match rel.as_slice() {
            ["CustomizationID"] => {
                set_once(&mut self.customization_id, text.into(), "Invoice.CustomizationID")?
            }
            ["ProfileID"] => set_once(&mut self.profile_id, text.into(), "Invoice.ProfileID")?,
            ["ID"] => set_once(&mut self.id, text.into(), "Invoice.ID")?,
            ["IssueDate"] => set_once(
                &mut self.issue_date,
                parse_date("Invoice.IssueDate", text)?,
                "Invoice.IssueDate",
            )?,
            ["DueDate"] => set_once(
                &mut self.due_date,
                parse_date("Invoice.DueDate", text)?,
                "Invoice.DueDate",
            )?,
            ["InvoiceTypeCode"] => {
                set_once(&mut self.type_code, text.into(), "Invoice.InvoiceTypeCode")?
            }
            ["Note"] => self.notes.push(text.into()),
            ["TaxPointDate"] => set_once(
                &mut self.tax_point_date,
                parse_date("Invoice.TaxPointDate", text)?,
                "Invoice.TaxPointDate",
            )?,
            ["DocumentCurrencyCode"] => set_once(
                &mut self.currency_code,
                text.into(),
                "Invoice.DocumentCurrencyCode",
            )?,
            ["TaxCurrencyCode"] => set_once(
                &mut self.tax_currency_code,
                text.into(),
                "Invoice.TaxCurrencyCode",
            )?,
            ["AccountingCost"] => {
                set_once(&mut self.accounting_cost, text.into(), "Invoice.AccountingCost")?
            }
            ["BuyerReference"] => {
                set_once(&mut self.buyer_reference, text.into(), "Invoice.BuyerReference")?
            }
            ["InvoicePeriod", rest @ ..] => self
                .invoice_period
                .get_or_insert_with(PeriodAcc::default)
                .text(rest, text, "Invoice.InvoicePeriod")?,
            ["OrderReference", "ID"] => {
                set_once(&mut self.order_id, text.into(), "Invoice.OrderReference.ID")?
            }
            ["OrderReference", "SalesOrderID"] => set_once(
                &mut self.sales_order_id,
                text.into(),
                "Invoice.OrderReference.SalesOrderID",
            )?,
            ["BillingReference", rest @ ..] => {
                if let Some(billing) = self.current_billing.as_mut() {
                    billing.text(rest, text)?;
                }
            }
            ["DespatchDocumentReference", "ID"] => set_once(
                &mut self.despatch_document_reference,
                text.into(),
                "Invoice.DespatchDocumentReference.ID",
            )?,
            ["ReceiptDocumentReference", "ID"] => set_once(
                &mut self.receipt_document_reference,
                text.into(),
                "Invoice.ReceiptDocumentReference.ID",
            )?,
            ["OriginatorDocumentReference", "ID"] => set_once(
                &mut self.originator_document_reference,
                text.into(),
                "Invoice.OriginatorDocumentReference.ID",
            )?,
            ["ContractDocumentReference", "ID"] => set_once(
                &mut self.contract_document_reference,
                text.into(),
                "Invoice.ContractDocumentReference.ID",
            )?,
            ["AdditionalDocumentReference", rest @ ..] => {
                if let Some(reference) = self.current_document_reference.as_mut() {
                    reference.text(rest, pending, text)?;
                }
            }
            ["ProjectReference", "ID"] => set_once(
                &mut self.project_reference,
                text.into(),
                "Invoice.ProjectReference.ID",
            )?,
            ["AccountingSupplierParty", "Party", rest @ ..] => self.supplier.text(
                rest,
                pending,
                text,
                "Invoice.AccountingSupplierParty.Party",
            )?,
            ["AccountingCustomerParty", "Party", rest @ ..] => self.customer.text(
                rest,
                pending,
                text,
                "Invoice.AccountingCustomerParty.Party",
            )?,
            ["PayeeParty", rest @ ..] => self
                .payee
                .get_or_insert_with(PartyAcc::default)
                .text(rest, pending, text, "Invoice.PayeeParty")?,
            ["TaxRepresentativeParty", rest @ ..] => self
                .tax_representative
                .get_or_insert_with(PartyAcc::default)
                .text(rest, pending, text, "Invoice.TaxRepresentativeParty")?,
            ["Delivery", rest @ ..] => self
                .delivery
                .get_or_insert_with(DeliveryAcc::default)
                .text(rest, pending, text)?,
            ["PaymentMeans", rest @ ..] => {
                if let Some(means) = self.current_payment_means.as_mut() {
                    means.text(rest, pending, text)?;
                }
            }
            ["PaymentTerms", "Note"] => set_once(
                &mut self.payment_terms_note,
                text.into(),
                "Invoice.PaymentTerms.Note",
            )?,
            ["AllowanceCharge", rest @ ..] => {
                if let Some(ac) = self.current_allowance.as_mut() {
                    ac.text(rest, pending, text)?;
                }
            }
            ["TaxTotal", rest @ ..] => {
                if let Some(total) = self.current_tax_total.as_mut() {
                    total.text(rest, pending, text)?;
                }
            }
            ["LegalMonetaryTotal", rest @ ..] => self.totals.text(rest, pending, text)?,
            ["InvoiceLine", rest @ ..] => {
                if let Some(line) = self.current_line.as_mut() {
                    line.text(rest, pending, text)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Invoice, StructuralError> {
        let order_reference = match (self.order_id, self.sales_order_id) {
            (Some(id), sales_order_id) => Some(OrderReference { id, sales_order_id }),
            (None, Some(_)) => {
                return Err(StructuralError::MissingElement {
                    path: "Invoice.OrderReference.ID".into(),
                })
            }
            (None, None) => None,
        };

        let supplier = self.supplier.finish("Invoice.AccountingSupplierParty.Party")?;
        let customer = self.customer.finish("Invoice.AccountingCustomerParty.Party")?;
        let payee = match self.payee {
            Some(acc) => Some(acc.finish("Invoice.PayeeParty")?),
            None => None,
        };
        let tax_representative = match self.tax_representative {
            Some(acc) => Some(acc.finish("Invoice.TaxRepresentativeParty")?),
            None => None,
        };

        let type_code = required(self.type_code, "Invoice.InvoiceTypeCode")?;
        let monetary_total = self.totals.finish()?;

        if self.lines.is_empty() {
            return Err(StructuralError::MissingElement {
                path: "Invoice.InvoiceLine".into(),
            });
        }

        Ok(Invoice {
            customization_id: required(self.customization_id, "Invoice.CustomizationID")?,
            profile_id: required(self.profile_id, "Invoice.ProfileID")?,
            id: required(self.id, "Invoice.ID")?,
            issue_date: required(self.issue_date, "Invoice.IssueDate")?,
            due_date: self.due_date,
            type_code: InvoiceTypeCode::from_code(&type_code),
            notes: self.notes,
            tax_point_date: self.tax_point_date,
            currency_code: required(self.currency_code, "Invoice.DocumentCurrencyCode")?,
            tax_currency_code: self.tax_currency_code,
            accounting_cost: self.accounting_cost,
            buyer_reference: self.buyer_reference,
            invoice_period: self.invoice_period.and_then(PeriodAcc::finish),
            order_reference,
            billing_references: self.billing_references,
            despatch_document_reference: self.despatch_document_reference,
            receipt_document_reference: self.receipt_document_reference,
            originator_document_reference: self.originator_document_reference,
            contract_document_reference: self.contract_document_reference,
            additional_document_references: self.additional_document_references,
            project_reference: self.project_reference,
            supplier,
            customer,
            payee,
            tax_representative,
            delivery: self.delivery.map(DeliveryAcc::finish),
            payment_means: self.payment_means,
            payment_terms: self.payment_terms_note.map(|note| PaymentTerms { note }),
            allowance_charges: self.allowance_charges,
            tax_totals: self.tax_totals,
            monetary_total,
            lines: self.lines,
        })
    }
}

#[derive(Default)]
struct PeriodAcc {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    description_code: Option<String>,
}

impl PeriodAcc {
    fn text(&mut self, rel: &[&str], text: &str, base: &str) -> Result<(), StructuralError> {
        match rel {
            ["StartDate"] => {
                let path = format!("{base}.StartDate");
                set_once(&mut self.start_date, parse_date(&path, text)?, &path)?;
            }
            ["EndDate"] => {
                let path = format!("{base}.EndDate");
                set_once(&mut self.end_date, parse_date(&path, text)?, &path)?;
            }
            ["DescriptionCode"] => set_once(
                &mut self.description_code,
                text.into(),
                &format!("{base}.DescriptionCode"),
            )?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Option<Period> {
        if self.start_date.is_none() && self.end_date.is_none() && self.description_code.is_none() {
            return None;
        }
        Some(Period {
            start_date: self.start_date,
            end_date: self.end_date,
            description_code: self.description_code,
        })
    }
}

struct BillingAcc {
    base: String,
    id: Option<String>,
    issue_date: Option<NaiveDate>,
}

impl BillingAcc {
    fn new(index: usize) -> Self {
        Self {
            base: format!("Invoice.BillingReference[{index}].InvoiceDocumentReference"),
            id: None,
            issue_date: None,
        }
    }

    fn text(&mut self, rel: &[&str], text: &str) -> Result<(), StructuralError> {
        match rel {
            ["InvoiceDocumentReference", "ID"] => {
                set_once(&mut self.id, text.into(), &format!("{}.ID", self.base))?
            }
            ["InvoiceDocumentReference", "IssueDate"] => {
                let path = format!("{}.IssueDate", self.base);
                set_once(&mut self.issue_date, parse_date(&path, text)?, &path)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<BillingReference, StructuralError> {
        Ok(BillingReference {
            id: required(self.id, &format!("{}.ID", self.base))?,
            issue_date: self.issue_date,
        })
    }
}

struct DocumentReferenceAcc {
    base: String,
    id: Option<String>,
    scheme_id: Option<String>,
    document_type_code: Option<String>,
    description: Option<String>,
    attachment: Option<Attachment>,
    external_uri: Option<String>,
}

impl DocumentReferenceAcc {
    fn new(index: usize) -> Self {
        Self {
            base: format!("Invoice.AdditionalDocumentReference[{index}]"),
            id: None,
            scheme_id: None,
            document_type_code: None,
            description: None,
            attachment: None,
            external_uri: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["ID"] => {
                self.scheme_id = pending.scheme_id.take();
                set_once(&mut self.id, text.into(), &format!("{}.ID", self.base))?;
            }
            ["DocumentTypeCode"] => set_once(
                &mut self.document_type_code,
                text.into(),
                &format!("{}.DocumentTypeCode", self.base),
            )?,
            ["DocumentDescription"] => set_once(
                &mut self.description,
                text.into(),
                &format!("{}.DocumentDescription", self.base),
            )?,
            ["Attachment", "EmbeddedDocumentBinaryObject"] => {
                let path = format!("{}.Attachment.EmbeddedDocumentBinaryObject", self.base);
                let mime_code =
                    pending
                        .mime_code
                        .take()
                        .ok_or_else(|| StructuralError::MissingAttribute {
                            path: path.clone(),
                            attribute: "mimeCode".into(),
                        })?;
                let filename =
                    pending
                        .filename
                        .take()
                        .ok_or_else(|| StructuralError::MissingAttribute {
                            path: path.clone(),
                            attribute: "filename".into(),
                        })?;
                set_once(
                    &mut self.attachment,
                    Attachment {
                        content: text.into(),
                        mime_code,
                        filename,
                    },
                    &path,
                )?;
            }
            ["Attachment", "ExternalReference", "URI"] => set_once(
                &mut self.external_uri,
                text.into(),
                &format!("{}.Attachment.ExternalReference.URI", self.base),
            )?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<AdditionalDocumentReference, StructuralError> {
        Ok(AdditionalDocumentReference {
            id: required(self.id, &format!("{}.ID", self.base))?,
            scheme_id: self.scheme_id,
            document_type_code: self.document_type_code,
            description: self.description,
            attachment: self.attachment,
            external_uri: self.external_uri,
        })
    }
}

#[derive(Default)]
struct PartyAcc {
    endpoint: Option<ElectronicAddress>,
    identifications: Vec<Identifier>,
    name: Option<String>,
    address: AddressAcc,
    tax_registrations: Vec<TaxRegistration>,
    registration_name: Option<String>,
    company_id: Option<Identifier>,
    company_legal_form: Option<String>,
    contact_name: Option<String>,
    contact_telephone: Option<String>,
    contact_email: Option<String>,
}

impl PartyAcc {
    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
        base: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["EndpointID"] => {
                let path = format!("{base}.EndpointID");
                let scheme_id =
                    pending
                        .scheme_id
                        .take()
                        .ok_or_else(|| StructuralError::MissingAttribute {
                            path: path.clone(),
                            attribute: "schemeID".into(),
                        })?;
                set_once(
                    &mut self.endpoint,
                    ElectronicAddress {
                        scheme_id,
                        value: text.into(),
                    },
                    &path,
                )?;
            }
            ["PartyIdentification", "ID"] => self.identifications.push(Identifier {
                value: text.into(),
                scheme_id: pending.scheme_id.take(),
            }),
            ["PartyName", "Name"] => {
                set_once(&mut self.name, text.into(), &format!("{base}.PartyName.Name"))?
            }
            ["PostalAddress", rest @ ..] => {
                self.address
                    .text(rest, text, &format!("{base}.PostalAddress"))?
            }
            // CompanyID opens a registration; the TaxScheme/ID that follows
            // retags it as VAT or local tax.
            ["PartyTaxScheme", "CompanyID"] => self.tax_registrations.push(TaxRegistration {
                company_id: text.into(),
                scheme: TaxSchemeCode::Vat,
            }),
            ["PartyTaxScheme", "TaxScheme", "ID"] => {
                if let Some(last) = self.tax_registrations.last_mut() {
                    last.scheme = TaxSchemeCode::from_code(text);
                }
            }
            ["PartyLegalEntity", "RegistrationName"] => set_once(
                &mut self.registration_name,
                text.into(),
                &format!("{base}.PartyLegalEntity.RegistrationName"),
            )?,
            ["PartyLegalEntity", "CompanyID"] => {
                let identifier = Identifier {
                    value: text.into(),
                    scheme_id: pending.scheme_id.take(),
                };
                set_once(
                    &mut self.company_id,
                    identifier,
                    &format!("{base}.PartyLegalEntity.CompanyID"),
                )?;
            }
            ["PartyLegalEntity", "CompanyLegalForm"] => set_once(
                &mut self.company_legal_form,
                text.into(),
                &format!("{base}.PartyLegalEntity.CompanyLegalForm"),
            )?,
            ["Contact", "Name"] => {
                set_once(&mut self.contact_name, text.into(), &format!("{base}.Contact.Name"))?
            }
            ["Contact", "Telephone"] => set_once(
                &mut self.contact_telephone,
                text.into(),
                &format!("{base}.Contact.Telephone"),
            )?,
            ["Contact", "ElectronicMail"] => set_once(
                &mut self.contact_email,
                text.into(),
                &format!("{base}.Contact.ElectronicMail"),
            )?,
            _ => {}
        }
        Ok(())
    }

    /// Build the party. At least one of trading name and registration name
    /// must be present; each falls back to the other.
    fn finish(self, base: &str) -> Result<Party, StructuralError> {
        let name = match (self.name, &self.registration_name) {
            (Some(name), _) => name,
            (None, Some(registration)) => registration.clone(),
            (None, None) => {
                return Err(StructuralError::MissingElement {
                    path: format!("{base}.PartyLegalEntity.RegistrationName"),
                })
            }
        };
        let registration_name = self.registration_name.unwrap_or_else(|| name.clone());
        let contact = if self.contact_name.is_some()
            || self.contact_telephone.is_some()
            || self.contact_email.is_some()
        {
            Some(Contact {
                name: self.contact_name,
                telephone: self.contact_telephone,
                email: self.contact_email,
            })
        } else {
            None
        };
        Ok(Party {
            endpoint: self.endpoint,
            identifications: self.identifications,
            name,
            address: self.address.finish(),
            tax_registrations: self.tax_registrations,
            legal_entity: LegalEntity {
                registration_name,
                company_id: self.company_id,
                company_legal_form: self.company_legal_form,
            },
            contact,
        })
    }
}

#[derive(Default)]
struct AddressAcc {
    street: Option<String>,
    additional_street: Option<String>,
    address_line: Option<String>,
    city: Option<String>,
    postal_zone: Option<String>,
    country_subentity: Option<String>,
    country_code: Option<String>,
}

impl AddressAcc {
    fn text(&mut self, rel: &[&str], text: &str, base: &str) -> Result<(), StructuralError> {
        match rel {
            ["StreetName"] => {
                set_once(&mut self.street, text.into(), &format!("{base}.StreetName"))?
            }
            ["AdditionalStreetName"] => set_once(
                &mut self.additional_street,
                text.into(),
                &format!("{base}.AdditionalStreetName"),
            )?,
            ["AddressLine", "Line"] => set_once(
                &mut self.address_line,
                text.into(),
                &format!("{base}.AddressLine.Line"),
            )?,
            ["CityName"] => set_once(&mut self.city, text.into(), &format!("{base}.CityName"))?,
            ["PostalZone"] => {
                set_once(&mut self.postal_zone, text.into(), &format!("{base}.PostalZone"))?
            }
            ["CountrySubentity"] => set_once(
                &mut self.country_subentity,
                text.into(),
                &format!("{base}.CountrySubentity"),
            )?,
            ["Country", "IdentificationCode"] => set_once(
                &mut self.country_code,
                text.into(),
                &format!("{base}.Country.IdentificationCode"),
            )?,
            _ => {}
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.additional_street.is_none()
            && self.address_line.is_none()
            && self.city.is_none()
            && self.postal_zone.is_none()
            && self.country_subentity.is_none()
            && self.country_code.is_none()
    }

    /// A missing country comes out as an empty code; the country code-list
    /// rule reports it.
    fn finish(self) -> Address {
        Address {
            street: self.street,
            additional_street: self.additional_street,
            address_line: self.address_line,
            city: self.city,
            postal_zone: self.postal_zone,
            country_subentity: self.country_subentity,
            country_code: self.country_code.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct DeliveryAcc {
    actual_delivery_date: Option<NaiveDate>,
    location_id: Option<Identifier>,
    address: AddressAcc,
    party_name: Option<String>,
}

impl DeliveryAcc {
    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["ActualDeliveryDate"] => {
                let path = "Invoice.Delivery.ActualDeliveryDate";
                set_once(&mut self.actual_delivery_date, parse_date(path, text)?, path)?;
            }
            ["DeliveryLocation", "ID"] => {
                let identifier = Identifier {
                    value: text.into(),
                    scheme_id: pending.scheme_id.take(),
                };
                set_once(
                    &mut self.location_id,
                    identifier,
                    "Invoice.Delivery.DeliveryLocation.ID",
                )?;
            }
            ["DeliveryLocation", "Address", rest @ ..] => {
                self.address
                    .text(rest, text, "Invoice.Delivery.DeliveryLocation.Address")?
            }
            ["DeliveryParty", "PartyName", "Name"] => set_once(
                &mut self.party_name,
                text.into(),
                "Invoice.Delivery.DeliveryParty.PartyName.Name",
            )?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Delivery {
        let address = if self.address.is_empty() {
            None
        } else {
            Some(self.address.finish())
        };
        Delivery {
            actual_delivery_date: self.actual_delivery_date,
            location_id: self.location_id,
            address,
            party_name: self.party_name,
        }
    }
}

struct PaymentMeansAcc {
    base: String,
    code: Option<String>,
    name: Option<String>,
    payment_id: Option<String>,
    card_number: Option<String>,
    card_network: Option<String>,
    card_holder: Option<String>,
    account_id: Option<String>,
    account_name: Option<String>,
    branch_id: Option<String>,
    mandate_id: Option<String>,
    payer_account_id: Option<String>,
}

impl PaymentMeansAcc {
    fn new(index: usize) -> Self {
        Self {
            base: format!("Invoice.PaymentMeans[{index}]"),
            code: None,
            name: None,
            payment_id: None,
            card_number: None,
            card_network: None,
            card_holder: None,
            account_id: None,
            account_name: None,
            branch_id: None,
            mandate_id: None,
            payer_account_id: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["PaymentMeansCode"] => {
                self.name = pending.name.take();
                set_once(&mut self.code, text.into(), &format!("{}.PaymentMeansCode", self.base))?;
            }
            ["PaymentID"] => {
                set_once(&mut self.payment_id, text.into(), &format!("{}.PaymentID", self.base))?
            }
            ["CardAccount", "PrimaryAccountNumberID"] => set_once(
                &mut self.card_number,
                text.into(),
                &format!("{}.CardAccount.PrimaryAccountNumberID", self.base),
            )?,
            ["CardAccount", "NetworkID"] => set_once(
                &mut self.card_network,
                text.into(),
                &format!("{}.CardAccount.NetworkID", self.base),
            )?,
            ["CardAccount", "HolderName"] => set_once(
                &mut self.card_holder,
                text.into(),
                &format!("{}.CardAccount.HolderName", self.base),
            )?,
            ["PayeeFinancialAccount", "ID"] => set_once(
                &mut self.account_id,
                text.into(),
                &format!("{}.PayeeFinancialAccount.ID", self.base),
            )?,
            ["PayeeFinancialAccount", "Name"] => set_once(
                &mut self.account_name,
                text.into(),
                &format!("{}.PayeeFinancialAccount.Name", self.base),
            )?,
            ["PayeeFinancialAccount", "FinancialInstitutionBranch", "ID"] => set_once(
                &mut self.branch_id,
                text.into(),
                &format!("{}.PayeeFinancialAccount.FinancialInstitutionBranch.ID", self.base),
            )?,
            ["PaymentMandate", "ID"] => set_once(
                &mut self.mandate_id,
                text.into(),
                &format!("{}.PaymentMandate.ID", self.base),
            )?,
            ["PaymentMandate", "PayerFinancialAccount", "ID"] => set_once(
                &mut self.payer_account_id,
                text.into(),
                &format!("{}.PaymentMandate.PayerFinancialAccount.ID", self.base),
            )?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<PaymentMeans, StructuralError> {
        let code = required(self.code, &format!("{}.PaymentMeansCode", self.base))?;
        let card_account = self.card_number.map(|primary_account_number| CardAccount {
            primary_account_number,
            network_id: self.card_network.unwrap_or_default(),
            holder_name: self.card_holder,
        });
        let payee_account = self.account_id.map(|id| PayeeAccount {
            id,
            name: self.account_name,
            institution_branch_id: self.branch_id,
        });
        let mandate = if self.mandate_id.is_some() || self.payer_account_id.is_some() {
            Some(PaymentMandate {
                id: self.mandate_id,
                payer_account_id: self.payer_account_id,
            })
        } else {
            None
        };
        Ok(PaymentMeans {
            code: PaymentMeansCode::from_code(&code),
            name: self.name,
            payment_id: self.payment_id,
            card_account,
            payee_account,
            mandate,
        })
    }
}

struct AllowanceChargeAcc {
    base: String,
    charge_indicator: Option<bool>,
    reason_code: Option<String>,
    reason: Option<String>,
    multiplier_factor: Option<Decimal>,
    amount: Option<MonetaryAmount>,
    base_amount: Option<MonetaryAmount>,
    category_code: Option<String>,
    percent: Option<Decimal>,
}

impl AllowanceChargeAcc {
    fn new(base: String) -> Self {
        Self {
            base,
            charge_indicator: None,
            reason_code: None,
            reason: None,
            multiplier_factor: None,
            amount: None,
            base_amount: None,
            category_code: None,
            percent: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["ChargeIndicator"] => set_once(
                &mut self.charge_indicator,
                text == "true",
                &format!("{}.ChargeIndicator", self.base),
            )?,
            ["AllowanceChargeReasonCode"] => set_once(
                &mut self.reason_code,
                text.into(),
                &format!("{}.AllowanceChargeReasonCode", self.base),
            )?,
            ["AllowanceChargeReason"] => set_once(
                &mut self.reason,
                text.into(),
                &format!("{}.AllowanceChargeReason", self.base),
            )?,
            ["MultiplierFactorNumeric"] => {
                let path = format!("{}.MultiplierFactorNumeric", self.base);
                set_once(&mut self.multiplier_factor, parse_decimal(&path, text)?, &path)?;
            }
            ["Amount"] => {
                let path = format!("{}.Amount", self.base);
                set_once(&mut self.amount, parse_strict_amount(&path, text, pending)?, &path)?;
            }
            ["BaseAmount"] => {
                let path = format!("{}.BaseAmount", self.base);
                set_once(&mut self.base_amount, parse_strict_amount(&path, text, pending)?, &path)?;
            }
            ["TaxCategory", "ID"] => set_once(
                &mut self.category_code,
                text.into(),
                &format!("{}.TaxCategory.ID", self.base),
            )?,
            ["TaxCategory", "Percent"] => {
                let path = format!("{}.TaxCategory.Percent", self.base);
                set_once(&mut self.percent, parse_decimal(&path, text)?, &path)?;
            }
            // TaxScheme/ID is fixed to VAT
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<AllowanceCharge, StructuralError> {
        let tax_category = self.category_code.map(|code| TaxCategory {
            code: TaxCategoryCode::from_code(&code),
            percent: self.percent,
        });
        Ok(AllowanceCharge {
            charge_indicator: required(
                self.charge_indicator,
                &format!("{}.ChargeIndicator", self.base),
            )?,
            reason_code: self.reason_code,
            reason: self.reason,
            multiplier_factor: self.multiplier_factor,
            amount: required(self.amount, &format!("{}.Amount", self.base))?,
            base_amount: self.base_amount,
            tax_category,
        })
    }
}

struct TaxTotalAcc {
    base: String,
    tax_amount: Option<MonetaryAmount>,
    subtotals: Vec<TaxSubtotal>,
    current_subtotal: Option<SubtotalAcc>,
}

impl TaxTotalAcc {
    fn new(index: usize) -> Self {
        Self {
            base: format!("Invoice.TaxTotal[{index}]"),
            tax_amount: None,
            subtotals: Vec::new(),
            current_subtotal: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["TaxAmount"] => {
                let path = format!("{}.TaxAmount", self.base);
                set_once(&mut self.tax_amount, parse_strict_amount(&path, text, pending)?, &path)?;
            }
            ["TaxSubtotal", rest @ ..] => {
                if let Some(sub) = self.current_subtotal.as_mut() {
                    sub.text(rest, pending, text)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<TaxTotal, StructuralError> {
        Ok(TaxTotal {
            tax_amount: required(self.tax_amount, &format!("{}.TaxAmount", self.base))?,
            subtotals: self.subtotals,
        })
    }
}

struct SubtotalAcc {
    base: String,
    taxable_amount: Option<MonetaryAmount>,
    tax_amount: Option<MonetaryAmount>,
    category_code: Option<String>,
    percent: Option<Decimal>,
    exemption_reason_code: Option<String>,
    exemption_reason: Option<String>,
}

impl SubtotalAcc {
    fn new(parent: &str, index: usize) -> Self {
        Self {
            base: format!("{parent}.TaxSubtotal[{index}]"),
            taxable_amount: None,
            tax_amount: None,
            category_code: None,
            percent: None,
            exemption_reason_code: None,
            exemption_reason: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["TaxableAmount"] => {
                let path = format!("{}.TaxableAmount", self.base);
                set_once(
                    &mut self.taxable_amount,
                    parse_strict_amount(&path, text, pending)?,
                    &path,
                )?;
            }
            ["TaxAmount"] => {
                let path = format!("{}.TaxAmount", self.base);
                set_once(&mut self.tax_amount, parse_strict_amount(&path, text, pending)?, &path)?;
            }
            ["TaxCategory", "ID"] => set_once(
                &mut self.category_code,
                text.into(),
                &format!("{}.TaxCategory.ID", self.base),
            )?,
            ["TaxCategory", "Percent"] => {
                let path = format!("{}.TaxCategory.Percent", self.base);
                set_once(&mut self.percent, parse_decimal(&path, text)?, &path)?;
            }
            ["TaxCategory", "TaxExemptionReasonCode"] => set_once(
                &mut self.exemption_reason_code,
                text.into(),
                &format!("{}.TaxCategory.TaxExemptionReasonCode", self.base),
            )?,
            ["TaxCategory", "TaxExemptionReason"] => set_once(
                &mut self.exemption_reason,
                text.into(),
                &format!("{}.TaxCategory.TaxExemptionReason", self.base),
            )?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<TaxSubtotal, StructuralError> {
        let code = required(self.category_code, &format!("{}.TaxCategory.ID", self.base))?;
        Ok(TaxSubtotal {
            taxable_amount: required(
                self.taxable_amount,
                &format!("{}.TaxableAmount", self.base),
            )?,
            tax_amount: required(self.tax_amount, &format!("{}.TaxAmount", self.base))?,
            category: TaxCategory {
                code: TaxCategoryCode::from_code(&code),
                percent: self.percent,
            },
            exemption_reason_code: self.exemption_reason_code,
            exemption_reason: self.exemption_reason,
        })
    }
}

#[derive(Default)]
struct TotalsAcc {
    line_extension_amount: Option<MonetaryAmount>,
    tax_exclusive_amount: Option<MonetaryAmount>,
    tax_inclusive_amount: Option<MonetaryAmount>,
    allowance_total_amount: Option<MonetaryAmount>,
    charge_total_amount: Option<MonetaryAmount>,
    prepaid_amount: Option<MonetaryAmount>,
    payable_rounding_amount: Option<MonetaryAmount>,
    payable_amount: Option<MonetaryAmount>,
}

impl TotalsAcc {
    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        const BASE: &str = "Invoice.LegalMonetaryTotal";
        let slot = match rel {
            ["LineExtensionAmount"] => &mut self.line_extension_amount,
            ["TaxExclusiveAmount"] => &mut self.tax_exclusive_amount,
            ["TaxInclusiveAmount"] => &mut self.tax_inclusive_amount,
            ["AllowanceTotalAmount"] => &mut self.allowance_total_amount,
            ["ChargeTotalAmount"] => &mut self.charge_total_amount,
            ["PrepaidAmount"] => &mut self.prepaid_amount,
            ["PayableRoundingAmount"] => &mut self.payable_rounding_amount,
            ["PayableAmount"] => &mut self.payable_amount,
            _ => return Ok(()),
        };
        let path = format!("{BASE}.{}", rel[0]);
        set_once(slot, parse_strict_amount(&path, text, pending)?, &path)
    }

    fn finish(self) -> Result<MonetaryTotal, StructuralError> {
        const BASE: &str = "Invoice.LegalMonetaryTotal";
        Ok(MonetaryTotal {
            line_extension_amount: required(
                self.line_extension_amount,
                &format!("{BASE}.LineExtensionAmount"),
            )?,
            tax_exclusive_amount: required(
                self.tax_exclusive_amount,
                &format!("{BASE}.TaxExclusiveAmount"),
            )?,
            tax_inclusive_amount: required(
                self.tax_inclusive_amount,
                &format!("{BASE}.TaxInclusiveAmount"),
            )?,
            allowance_total_amount: self.allowance_total_amount,
            charge_total_amount: self.charge_total_amount,
            prepaid_amount: self.prepaid_amount,
            payable_rounding_amount: self.payable_rounding_amount,
            payable_amount: required(self.payable_amount, &format!("{BASE}.PayableAmount"))?,
        })
    }
}

struct LineAcc {
    base: String,
    id: Option<String>,
    note: Option<String>,
    quantity: Option<Quantity>,
    line_extension_amount: Option<MonetaryAmount>,
    accounting_cost: Option<String>,
    period: Option<PeriodAcc>,
    order_line_id: Option<String>,
    object_identifier: Option<Identifier>,
    allowance_charges: Vec<AllowanceCharge>,
    current_allowance: Option<AllowanceChargeAcc>,
    item_description: Option<String>,
    item_name: Option<String>,
    buyers_id: Option<String>,
    sellers_id: Option<String>,
    standard_id: Option<Identifier>,
    origin_country: Option<String>,
    classifications: Vec<CommodityClassification>,
    category_code: Option<String>,
    percent: Option<Decimal>,
    properties: Vec<ItemProperty>,
    price_amount: Option<MonetaryAmount>,
    base_quantity: Option<BaseQuantity>,
    price_allowance_amount: Option<MonetaryAmount>,
    price_allowance_base: Option<MonetaryAmount>,
}

impl LineAcc {
    fn new(index: usize) -> Self {
        Self {
            base: format!("Invoice.InvoiceLine[{index}]"),
            id: None,
            note: None,
            quantity: None,
            line_extension_amount: None,
            accounting_cost: None,
            period: None,
            order_line_id: None,
            object_identifier: None,
            allowance_charges: Vec::new(),
            current_allowance: None,
            item_description: None,
            item_name: None,
            buyers_id: None,
            sellers_id: None,
            standard_id: None,
            origin_country: None,
            classifications: Vec::new(),
            category_code: None,
            percent: None,
            properties: Vec::new(),
            price_amount: None,
            base_quantity: None,
            price_allowance_amount: None,
            price_allowance_base: None,
        }
    }

    fn text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["ID"] => set_once(&mut self.id, text.into(), &format!("{}.ID", self.base))?,
            ["Note"] => set_once(&mut self.note, text.into(), &format!("{}.Note", self.base))?,
            ["InvoicedQuantity"] => {
                let path = format!("{}.InvoicedQuantity", self.base);
                let unit_code =
                    pending
                        .unit_code
                        .take()
                        .ok_or_else(|| StructuralError::MissingAttribute {
                            path: path.clone(),
                            attribute: "unitCode".into(),
                        })?;
                let quantity = Quantity {
                    value: parse_decimal(&path, text)?,
                    unit_code,
                };
                set_once(&mut self.quantity, quantity, &path)?;
            }
            ["LineExtensionAmount"] => {
                let path = format!("{}.LineExtensionAmount", self.base);
                set_once(
                    &mut self.line_extension_amount,
                    parse_strict_amount(&path, text, pending)?,
                    &path,
                )?;
            }
            ["AccountingCost"] => set_once(
                &mut self.accounting_cost,
                text.into(),
                &format!("{}.AccountingCost", self.base),
            )?,
            ["InvoicePeriod", rest @ ..] => {
                let base = format!("{}.InvoicePeriod", self.base);
                self.period
                    .get_or_insert_with(PeriodAcc::default)
                    .text(rest, text, &base)?;
            }
            ["OrderLineReference", "LineID"] => set_once(
                &mut self.order_line_id,
                text.into(),
                &format!("{}.OrderLineReference.LineID", self.base),
            )?,
            ["DocumentReference", "ID"] => {
                let identifier = Identifier {
                    value: text.into(),
                    scheme_id: pending.scheme_id.take(),
                };
                set_once(
                    &mut self.object_identifier,
                    identifier,
                    &format!("{}.DocumentReference.ID", self.base),
                )?;
            }
            // DocumentReference/DocumentTypeCode is fixed to 130
            ["AllowanceCharge", rest @ ..] => {
                if let Some(ac) = self.current_allowance.as_mut() {
                    ac.text(rest, pending, text)?;
                }
            }
            ["Item", rest @ ..] => self.item_text(rest, pending, text)?,
            ["Price", rest @ ..] => self.price_text(rest, pending, text)?,
            _ => {}
        }
        Ok(())
    }

    fn item_text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["Description"] => set_once(
                &mut self.item_description,
                text.into(),
                &format!("{}.Item.Description", self.base),
            )?,
            ["Name"] => {
                set_once(&mut self.item_name, text.into(), &format!("{}.Item.Name", self.base))?
            }
            ["BuyersItemIdentification", "ID"] => set_once(
                &mut self.buyers_id,
                text.into(),
                &format!("{}.Item.BuyersItemIdentification.ID", self.base),
            )?,
            ["SellersItemIdentification", "ID"] => set_once(
                &mut self.sellers_id,
                text.into(),
                &format!("{}.Item.SellersItemIdentification.ID", self.base),
            )?,
            ["StandardItemIdentification", "ID"] => {
                let identifier = Identifier {
                    value: text.into(),
                    scheme_id: pending.scheme_id.take(),
                };
                set_once(
                    &mut self.standard_id,
                    identifier,
                    &format!("{}.Item.StandardItemIdentification.ID", self.base),
                )?;
            }
            ["OriginCountry", "IdentificationCode"] => set_once(
                &mut self.origin_country,
                text.into(),
                &format!("{}.Item.OriginCountry.IdentificationCode", self.base),
            )?,
            ["CommodityClassification", "ItemClassificationCode"] => {
                let path = format!(
                    "{}.Item.CommodityClassification[{}].ItemClassificationCode",
                    self.base,
                    self.classifications.len()
                );
                let list_id =
                    pending
                        .list_id
                        .take()
                        .ok_or_else(|| StructuralError::MissingAttribute {
                            path,
                            attribute: "listID".into(),
                        })?;
                self.classifications.push(CommodityClassification {
                    code: text.into(),
                    list_id,
                    list_version_id: pending.list_version_id.take(),
                });
            }
            ["ClassifiedTaxCategory", "ID"] => set_once(
                &mut self.category_code,
                text.into(),
                &format!("{}.Item.ClassifiedTaxCategory.ID", self.base),
            )?,
            ["ClassifiedTaxCategory", "Percent"] => {
                let path = format!("{}.Item.ClassifiedTaxCategory.Percent", self.base);
                set_once(&mut self.percent, parse_decimal(&path, text)?, &path)?;
            }
            // Name precedes Value in the schema; the value attaches to the
            // property opened by its name.
            ["AdditionalItemProperty", "Name"] => self.properties.push(ItemProperty {
                name: text.into(),
                value: String::new(),
            }),
            ["AdditionalItemProperty", "Value"] => {
                if let Some(last) = self.properties.last_mut() {
                    last.value = text.into();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn price_text(
        &mut self,
        rel: &[&str],
        pending: &mut PendingAttrs,
        text: &str,
    ) -> Result<(), StructuralError> {
        match rel {
            ["PriceAmount"] => {
                let path = format!("{}.Price.PriceAmount", self.base);
                set_once(&mut self.price_amount, parse_amount(&path, text, pending)?, &path)?;
            }
            ["BaseQuantity"] => {
                let path = format!("{}.Price.BaseQuantity", self.base);
                let quantity = BaseQuantity {
                    value: parse_decimal(&path, text)?,
                    unit_code: pending.unit_code.take(),
                };
                set_once(&mut self.base_quantity, quantity, &path)?;
            }
            ["AllowanceCharge", "Amount"] => {
                let path = format!("{}.Price.AllowanceCharge.Amount", self.base);
                set_once(
                    &mut self.price_allowance_amount,
                    parse_amount(&path, text, pending)?,
                    &path,
                )?;
            }
            ["AllowanceCharge", "BaseAmount"] => {
                let path = format!("{}.Price.AllowanceCharge.BaseAmount", self.base);
                set_once(
                    &mut self.price_allowance_base,
                    parse_amount(&path, text, pending)?,
                    &path,
                )?;
            }
            // The price allowance indicator is fixed to false
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<InvoiceLine, StructuralError> {
        let category_code = required(
            self.category_code,
            &format!("{}.Item.ClassifiedTaxCategory.ID", self.base),
        )?;
        let item = Item {
            description: self.item_description,
            name: required(self.item_name, &format!("{}.Item.Name", self.base))?,
            buyers_id: self.buyers_id,
            sellers_id: self.sellers_id,
            standard_id: self.standard_id,
            origin_country: self.origin_country,
            classifications: self.classifications,
            tax_category: TaxCategory {
                code: TaxCategoryCode::from_code(&category_code),
                percent: self.percent,
            },
            properties: self.properties,
        };
        let price = Price {
            amount: required(self.price_amount, &format!("{}.Price.PriceAmount", self.base))?,
            base_quantity: self.base_quantity,
            allowance: self.price_allowance_amount.map(|amount| PriceAllowance {
                amount,
                base_amount: self.price_allowance_base,
            }),
        };
        Ok(InvoiceLine {
            id: required(self.id, &format!("{}.ID", self.base))?,
            note: self.note,
            quantity: required(self.quantity, &format!("{}.InvoicedQuantity", self.base))?,
            line_extension_amount: required(
                self.line_extension_amount,
                &format!("{}.LineExtensionAmount", self.base),
            )?,
            accounting_cost: self.accounting_cost,
            period: self.period.and_then(PeriodAcc::finish),
            order_line_id: self.order_line_id,
            object_identifier: self.object_identifier,
            allowance_charges: self.allowance_charges,
            item,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::core::{AddressBuilder, InvoiceBuilder, LineBuilder, PartyBuilder};
    use crate::ubl::to_xml;

    fn sample() -> Invoice {
        InvoiceBuilder::new("INV-200", NaiveDate::from_ymd_opt(2025, 9, 15).unwrap())
            .due_date(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap())
            .buyer_reference("PO-881")
            .supplier(
                PartyBuilder::new(
                    "Lieferant GmbH",
                    AddressBuilder::new("Hamburg", "20095", "DE")
                        .street("Deichstrasse 9")
                        .build(),
                )
                .endpoint("9930", "DE987654321")
                .vat_id("DE987654321")
                .build(),
            )
            .customer(
                PartyBuilder::new(
                    "Acheteur SARL",
                    AddressBuilder::new("Paris", "75002", "FR").build(),
                )
                .endpoint("9957", "FR32123456789")
                .build(),
            )
            .add_line(
                LineBuilder::new("1", "Consulting", dec!(8), "HUR", dec!(120.00))
                    .tax(TaxCategoryCode::StandardRate, dec!(19))
                    .build(),
            )
            .add_line(
                LineBuilder::new("2", "Travel", dec!(1), "C62", dec!(350.00))
                    .tax(TaxCategoryCode::StandardRate, dec!(19))
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn round_trips_the_model() {
        let invoice = sample();
        let xml = to_xml(&invoice).unwrap();
        let parsed = from_xml(&xml).unwrap();
        assert_eq!(parsed, invoice);
    }

    #[test]
    fn accepts_arbitrary_prefixes() {
        let invoice = sample();
        let xml = to_xml(&invoice)
            .unwrap()
            .replace("cbc:", "ns1:")
            .replace("cac:", "ns2:");
        let parsed = from_xml(&xml).unwrap();
        assert_eq!(parsed, invoice);
    }

    #[test]
    fn accepts_unprefixed_elements() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2">
  <CustomizationID>urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0</CustomizationID>
  <ProfileID>urn:fdc:peppol.eu:2017:poacc:billing:01:1.0</ProfileID>
  <ID>PLAIN-1</ID>
  <IssueDate>2025-07-01</IssueDate>
  <InvoiceTypeCode>380</InvoiceTypeCode>
  <DocumentCurrencyCode>EUR</DocumentCurrencyCode>
  <AccountingSupplierParty>
    <Party>
      <PostalAddress>
        <Country><IdentificationCode>DE</IdentificationCode></Country>
      </PostalAddress>
      <PartyLegalEntity>
        <RegistrationName>Seller AG</RegistrationName>
      </PartyLegalEntity>
    </Party>
  </AccountingSupplierParty>
  <AccountingCustomerParty>
    <Party>
      <PostalAddress>
        <Country><IdentificationCode>DE</IdentificationCode></Country>
      </PostalAddress>
      <PartyLegalEntity>
        <RegistrationName>Buyer AG</RegistrationName>
      </PartyLegalEntity>
    </Party>
  </AccountingCustomerParty>
  <LegalMonetaryTotal>
    <LineExtensionAmount currencyID="EUR">100.00</LineExtensionAmount>
    <TaxExclusiveAmount currencyID="EUR">100.00</TaxExclusiveAmount>
    <TaxInclusiveAmount currencyID="EUR">119.00</TaxInclusiveAmount>
    <PayableAmount currencyID="EUR">119.00</PayableAmount>
  </LegalMonetaryTotal>
  <InvoiceLine>
    <ID>1</ID>
    <InvoicedQuantity unitCode="C62">1</InvoicedQuantity>
    <LineExtensionAmount currencyID="EUR">100.00</LineExtensionAmount>
    <Item>
      <Name>Thing</Name>
      <ClassifiedTaxCategory>
        <ID>S</ID>
        <Percent>19</Percent>
      </ClassifiedTaxCategory>
    </Item>
    <Price>
      <PriceAmount currencyID="EUR">100.00</PriceAmount>
    </Price>
  </InvoiceLine>
</Invoice>"#;
        let invoice = from_xml(xml).unwrap();
        assert_eq!(invoice.id, "PLAIN-1");
        assert_eq!(invoice.supplier.name, "Seller AG");
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].quantity.unit_code, "C62");
        assert_eq!(invoice.lines[0].item.tax_category.percent, Some(dec!(19)));
    }

    #[test]
    fn rejects_wrong_root() {
        let err = from_xml("<CreditNote><ID>1</ID></CreditNote>").unwrap_err();
        match err {
            StructuralError::UnexpectedRoot(name) => assert_eq!(name, "CreditNote"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = from_xml("<ubl:Invoice><cbc:ID>x</cbc:Wrong></ubl:Invoice>").unwrap_err();
        assert!(matches!(err, StructuralError::Xml(_)));
    }

    #[test]
    fn rejects_missing_invoice_number() {
        let xml = to_xml(&sample()).unwrap().replace("<cbc:ID>INV-200</cbc:ID>", "");
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::MissingElement { path } => assert_eq!(path, "Invoice.ID"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_duplicate_currency_code() {
        let doubled = "<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>\
                       <cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>";
        let xml = to_xml(&sample())
            .unwrap()
            .replace("<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>", doubled);
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::Cardinality { path } => {
                assert_eq!(path, "Invoice.DocumentCurrencyCode");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unparseable_decimal() {
        let xml = to_xml(&sample()).unwrap().replace(
            r#"<cbc:PayableAmount currencyID="EUR">1558.90</cbc:PayableAmount>"#,
            r#"<cbc:PayableAmount currencyID="EUR">15z8.90</cbc:PayableAmount>"#,
        );
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::InvalidDecimal { path, value } => {
                assert_eq!(path, "Invoice.LegalMonetaryTotal.PayableAmount");
                assert_eq!(value, "15z8.90");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unparseable_date() {
        let xml = to_xml(&sample())
            .unwrap()
            .replace("<cbc:IssueDate>2025-09-15</cbc:IssueDate>", "<cbc:IssueDate>15.09.2025</cbc:IssueDate>");
        let err = from_xml(&xml).unwrap_err();
        assert!(matches!(err, StructuralError::InvalidDate { .. }));
    }

    #[test]
    fn rejects_oversized_amount_scale() {
        let xml = to_xml(&sample()).unwrap().replace(
            r#"<cbc:PayableAmount currencyID="EUR">1558.90</cbc:PayableAmount>"#,
            r#"<cbc:PayableAmount currencyID="EUR">1558.901</cbc:PayableAmount>"#,
        );
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::AmountScale { path, value } => {
                assert_eq!(path, "Invoice.LegalMonetaryTotal.PayableAmount");
                assert_eq!(value, "1558.901");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_amount_without_currency() {
        let xml = to_xml(&sample()).unwrap().replace(
            r#"<cbc:PayableAmount currencyID="EUR">1558.90</cbc:PayableAmount>"#,
            "<cbc:PayableAmount>1558.90</cbc:PayableAmount>",
        );
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::MissingAttribute { path, attribute } => {
                assert_eq!(path, "Invoice.LegalMonetaryTotal.PayableAmount");
                assert_eq!(attribute, "currencyID");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_quantity_without_unit() {
        let xml = to_xml(&sample()).unwrap().replace(
            r#"<cbc:InvoicedQuantity unitCode="HUR">8.00</cbc:InvoicedQuantity>"#,
            "<cbc:InvoicedQuantity>8.00</cbc:InvoicedQuantity>",
        );
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::MissingAttribute { path, attribute } => {
                assert_eq!(path, "Invoice.InvoiceLine[0].InvoicedQuantity");
                assert_eq!(attribute, "unitCode");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_document_without_lines() {
        let xml = to_xml(&sample()).unwrap();
        let start = xml.find("<cac:InvoiceLine>").unwrap();
        let end = xml.rfind("</cac:InvoiceLine>").unwrap() + "</cac:InvoiceLine>".len();
        let gutted = format!("{}{}", &xml[..start], &xml[end..]);
        let err = from_xml(&gutted).unwrap_err();
        match err {
            StructuralError::MissingElement { path } => assert_eq!(path, "Invoice.InvoiceLine"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ignores_unknown_elements() {
        let invoice = sample();
        let xml = to_xml(&invoice).unwrap().replace(
            "<cbc:DocumentCurrencyCode>",
            "<cbc:FutureField>ignored</cbc:FutureField>\
             <cac:FutureBlock><cbc:Inner attr=\"x\">nested</cbc:Inner></cac:FutureBlock>\
             <cbc:DocumentCurrencyCode>",
        );
        let parsed = from_xml(&xml).unwrap();
        assert_eq!(parsed, invoice);
    }

    #[test]
    fn unescapes_text_content() {
        let invoice = sample();
        let xml = to_xml(&invoice).unwrap().replace(
            "<cbc:BuyerReference>PO-881</cbc:BuyerReference>",
            "<cbc:BuyerReference>P&amp;O &lt;881&gt;</cbc:BuyerReference>",
        );
        let parsed = from_xml(&xml).unwrap();
        assert_eq!(parsed.buyer_reference.as_deref(), Some("P&O <881>"));
    }

    #[test]
    fn no_partial_model_on_error() {
        // The defect sits in the second line; the whole parse fails.
        let xml = to_xml(&sample()).unwrap().replace(
            "<cbc:ID>2</cbc:ID>",
            "<cbc:ID>2</cbc:ID><cbc:ID>2b</cbc:ID>",
        );
        let err = from_xml(&xml).unwrap_err();
        match err {
            StructuralError::Cardinality { path } => {
                assert_eq!(path, "Invoice.InvoiceLine[1].ID");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
