use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::error::BuildError;
use super::types::*;

/// Input limits to prevent abuse.
const MAX_LINES: usize = 10_000;
const MAX_NOTES: usize = 100;
const MAX_ID_LEN: usize = 200;

/// Round a Decimal to `dp` decimal places using half-up (commercial) rounding.
///
/// This is the rounding every derived total in this crate uses; consistency
/// checks in the rule engine assume it.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Builder for constructing invoices on the producer path.
///
/// Computes the derived entities (line extensions via [`LineBuilder`], the
/// VAT breakdown grouped by category and rate, the monetary totals) with
/// half-up rounding. It does not run business validation; feed the result to
/// the rule engine separately.
///
/// ```
/// use chrono::NaiveDate;
/// use peppol_billing::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("INV-2025-001", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
///     .due_date(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
///     .buyer_reference("PO-4711")
///     .supplier(PartyBuilder::new("ACME GmbH", AddressBuilder::new("Berlin", "10115", "DE").build())
///         .endpoint("9930", "DE123456789")
///         .vat_id("DE123456789")
///         .build())
///     .customer(PartyBuilder::new("Kunde AB", AddressBuilder::new("Stockholm", "11120", "SE").build())
///         .endpoint("0007", "5567890123")
///         .build())
///     .add_line(LineBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150))
///         .tax(TaxCategoryCode::StandardRate, dec!(25))
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.monetary_total.payable_amount.value, dec!(1875.00));
/// ```
pub struct InvoiceBuilder {
    id: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    type_code: InvoiceTypeCode,
    currency_code: String,
    tax_currency: Option<(String, Decimal)>,
    notes: Vec<String>,
    tax_point_date: Option<NaiveDate>,
    accounting_cost: Option<String>,
    buyer_reference: Option<String>,
    invoice_period: Option<Period>,
    order_reference: Option<OrderReference>,
    billing_references: Vec<BillingReference>,
    despatch_document_reference: Option<String>,
    receipt_document_reference: Option<String>,
    originator_document_reference: Option<String>,
    contract_document_reference: Option<String>,
    additional_document_references: Vec<AdditionalDocumentReference>,
    project_reference: Option<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    payee: Option<Party>,
    tax_representative: Option<Party>,
    delivery: Option<Delivery>,
    payment_means: Vec<PaymentMeans>,
    payment_terms: Option<PaymentTerms>,
    allowance_charges: Vec<AllowanceCharge>,
    exemptions: Vec<(TaxCategoryCode, Option<String>, Option<String>)>,
    lines: Vec<InvoiceLine>,
    prepaid: Decimal,
    payable_rounding: Option<Decimal>,
}

impl InvoiceBuilder {
    pub fn new(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            issue_date,
            due_date: None,
            type_code: InvoiceTypeCode::Commercial,
            currency_code: "EUR".to_string(),
            tax_currency: None,
            notes: Vec::new(),
            tax_point_date: None,
            accounting_cost: None,
            buyer_reference: None,
            invoice_period: None,
            order_reference: None,
            billing_references: Vec::new(),
            despatch_document_reference: None,
            receipt_document_reference: None,
            originator_document_reference: None,
            contract_document_reference: None,
            additional_document_references: Vec::new(),
            project_reference: None,
            supplier: None,
            customer: None,
            payee: None,
            tax_representative: None,
            delivery: None,
            payment_means: Vec::new(),
            payment_terms: None,
            allowance_charges: Vec::new(),
            exemptions: Vec::new(),
            lines: Vec::new(),
            prepaid: Decimal::ZERO,
            payable_rounding: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn type_code(mut self, code: InvoiceTypeCode) -> Self {
        self.type_code = code;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    /// Book VAT in a second currency. `amount` is the caller-computed total
    /// VAT in that currency; no exchange rates are applied here.
    pub fn tax_currency(mut self, code: impl Into<String>, amount: Decimal) -> Self {
        self.tax_currency = Some((code.into(), amount));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn tax_point_date(mut self, date: NaiveDate) -> Self {
        self.tax_point_date = Some(date);
        self
    }

    pub fn accounting_cost(mut self, reference: impl Into<String>) -> Self {
        self.accounting_cost = Some(reference.into());
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.buyer_reference = Some(reference.into());
        self
    }

    pub fn invoice_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.invoice_period = Some(Period {
            start_date: Some(start),
            end_date: Some(end),
            description_code: None,
        });
        self
    }

    pub fn order_reference(mut self, id: impl Into<String>) -> Self {
        let sales = self.order_reference.take().and_then(|o| o.sales_order_id);
        self.order_reference = Some(OrderReference {
            id: id.into(),
            sales_order_id: sales,
        });
        self
    }

    /// Sales order reference. Without a purchase order reference, UBL
    /// requires the literal "NA" as the order ID.
    pub fn sales_order_id(mut self, id: impl Into<String>) -> Self {
        let mut order = self.order_reference.take().unwrap_or(OrderReference {
            id: "NA".to_string(),
            sales_order_id: None,
        });
        order.sales_order_id = Some(id.into());
        self.order_reference = Some(order);
        self
    }

    pub fn billing_reference(mut self, id: impl Into<String>, issue_date: Option<NaiveDate>) -> Self {
        self.billing_references.push(BillingReference {
            id: id.into(),
            issue_date,
        });
        self
    }

    pub fn despatch_reference(mut self, id: impl Into<String>) -> Self {
        self.despatch_document_reference = Some(id.into());
        self
    }

    pub fn receipt_reference(mut self, id: impl Into<String>) -> Self {
        self.receipt_document_reference = Some(id.into());
        self
    }

    pub fn originator_reference(mut self, id: impl Into<String>) -> Self {
        self.originator_document_reference = Some(id.into());
        self
    }

    pub fn contract_reference(mut self, id: impl Into<String>) -> Self {
        self.contract_document_reference = Some(id.into());
        self
    }

    pub fn add_document_reference(mut self, reference: AdditionalDocumentReference) -> Self {
        self.additional_document_references.push(reference);
        self
    }

    pub fn project_reference(mut self, id: impl Into<String>) -> Self {
        self.project_reference = Some(id.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn payee(mut self, party: Party) -> Self {
        self.payee = Some(party);
        self
    }

    pub fn tax_representative(mut self, party: Party) -> Self {
        self.tax_representative = Some(party);
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn add_payment_means(mut self, means: PaymentMeans) -> Self {
        self.payment_means.push(means);
        self
    }

    pub fn payment_terms(mut self, note: impl Into<String>) -> Self {
        self.payment_terms = Some(PaymentTerms { note: note.into() });
        self
    }

    /// Add a document-level allowance; the charge indicator is forced to false.
    pub fn add_allowance(mut self, allowance: AllowanceCharge) -> Self {
        self.allowance_charges.push(AllowanceCharge {
            charge_indicator: false,
            ..allowance
        });
        self
    }

    /// Add a document-level charge; the charge indicator is forced to true.
    pub fn add_charge(mut self, charge: AllowanceCharge) -> Self {
        self.allowance_charges.push(AllowanceCharge {
            charge_indicator: true,
            ..charge
        });
        self
    }

    /// Attach an exemption reason to the VAT breakdown of `category`.
    pub fn exemption(
        mut self,
        category: TaxCategoryCode,
        reason_code: Option<String>,
        reason: Option<String>,
    ) -> Self {
        self.exemptions.push((category, reason_code, reason));
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.prepaid = amount;
        self
    }

    pub fn payable_rounding(mut self, amount: Decimal) -> Self {
        self.payable_rounding = Some(amount);
        self
    }

    /// Assemble the invoice, computing the VAT breakdown and monetary totals.
    pub fn build(self) -> Result<Invoice, BuildError> {
        let supplier = self.supplier.ok_or(BuildError::Missing("supplier"))?;
        let customer = self.customer.ok_or(BuildError::Missing("customer"))?;

        if self.id.trim().is_empty() {
            return Err(BuildError::EmptyField("invoice id"));
        }
        if self.id.len() > MAX_ID_LEN {
            return Err(BuildError::FieldTooLong {
                field: "invoice id",
                limit: MAX_ID_LEN,
            });
        }
        if self.lines.is_empty() {
            return Err(BuildError::NoLines);
        }
        if self.lines.len() > MAX_LINES {
            return Err(BuildError::TooManyLines(self.lines.len()));
        }
        if self.notes.len() > MAX_NOTES {
            return Err(BuildError::TooManyNotes(self.notes.len()));
        }

        let currency = self.currency_code.clone();
        let (tax_totals, monetary_total) = compute_totals(
            &self.lines,
            &self.allowance_charges,
            &self.exemptions,
            &currency,
            self.tax_currency.as_ref(),
            self.prepaid,
            self.payable_rounding,
        );

        Ok(Invoice {
            customization_id: BIS_CUSTOMIZATION_ID.to_string(),
            profile_id: BIS_PROFILE_ID.to_string(),
            id: self.id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            type_code: self.type_code,
            notes: self.notes,
            tax_point_date: self.tax_point_date,
            currency_code: self.currency_code,
            tax_currency_code: self.tax_currency.map(|(code, _)| code),
            accounting_cost: self.accounting_cost,
            buyer_reference: self.buyer_reference,
            invoice_period: self.invoice_period,
            order_reference: self.order_reference,
            billing_references: self.billing_references,
            despatch_document_reference: self.despatch_document_reference,
            receipt_document_reference: self.receipt_document_reference,
            originator_document_reference: self.originator_document_reference,
            contract_document_reference: self.contract_document_reference,
            additional_document_references: self.additional_document_references,
            project_reference: self.project_reference,
            supplier,
            customer,
            payee: self.payee,
            tax_representative: self.tax_representative,
            delivery: self.delivery,
            payment_means: self.payment_means,
            payment_terms: self.payment_terms,
            allowance_charges: self.allowance_charges,
            tax_totals,
            monetary_total,
            lines: self.lines,
        })
    }
}

/// Fold lines and document-level allowances/charges into the VAT breakdown
/// (grouped by category and rate) and the monetary totals.
fn compute_totals(
    lines: &[InvoiceLine],
    allowance_charges: &[AllowanceCharge],
    exemptions: &[(TaxCategoryCode, Option<String>, Option<String>)],
    currency: &str,
    tax_currency: Option<&(String, Decimal)>,
    prepaid: Decimal,
    payable_rounding: Option<Decimal>,
) -> (Vec<TaxTotal>, MonetaryTotal) {
    let line_extension_sum: Decimal = lines.iter().map(|l| l.line_extension_amount.value).sum();
    let allowance_sum: Decimal = allowance_charges
        .iter()
        .filter(|ac| !ac.charge_indicator)
        .map(|ac| ac.amount.value)
        .sum();
    let charge_sum: Decimal = allowance_charges
        .iter()
        .filter(|ac| ac.charge_indicator)
        .map(|ac| ac.amount.value)
        .sum();

    let tax_exclusive = line_extension_sum - allowance_sum + charge_sum;

    // Group taxable bases by (category, rate). Decimal hashes by value, so
    // 25 and 25.0 land in the same bucket.
    let mut groups: HashMap<(TaxCategoryCode, Option<Decimal>), Decimal> = HashMap::new();
    for line in lines {
        let key = (
            line.item.tax_category.code.clone(),
            line.item.tax_category.percent,
        );
        *groups.entry(key).or_insert(Decimal::ZERO) += line.line_extension_amount.value;
    }
    for ac in allowance_charges {
        let Some(cat) = &ac.tax_category else { continue };
        let key = (cat.code.clone(), cat.percent);
        let entry = groups.entry(key).or_insert(Decimal::ZERO);
        if ac.charge_indicator {
            *entry += ac.amount.value;
        } else {
            *entry -= ac.amount.value;
        }
    }

    let mut subtotals: Vec<TaxSubtotal> = Vec::new();
    let mut vat_sum = Decimal::ZERO;
    for ((code, percent), taxable) in &groups {
        let tax = round_half_up(taxable * percent.unwrap_or(Decimal::ZERO) / dec!(100), 2);
        vat_sum += tax;

        let exemption = exemptions.iter().find(|(c, _, _)| c == code);
        subtotals.push(TaxSubtotal {
            taxable_amount: MonetaryAmount::new(round_half_up(*taxable, 2), currency),
            tax_amount: MonetaryAmount::new(tax, currency),
            category: TaxCategory {
                code: code.clone(),
                percent: *percent,
            },
            exemption_reason_code: exemption.and_then(|(_, code, _)| code.clone()),
            exemption_reason: exemption.and_then(|(_, _, text)| text.clone()),
        });
    }

    // Sort the breakdown for deterministic output.
    subtotals.sort_by(|a, b| {
        a.category
            .code
            .code()
            .cmp(b.category.code.code())
            .then(a.category.percent.cmp(&b.category.percent))
    });

    let tax_inclusive = tax_exclusive + vat_sum;
    let rounding = payable_rounding.unwrap_or(Decimal::ZERO);
    let payable = tax_inclusive - prepaid + rounding;

    let mut tax_totals = vec![TaxTotal {
        tax_amount: MonetaryAmount::new(vat_sum, currency),
        subtotals,
    }];
    if let Some((code, amount)) = tax_currency {
        tax_totals.push(TaxTotal {
            tax_amount: MonetaryAmount::new(round_half_up(*amount, 2), code.clone()),
            subtotals: Vec::new(),
        });
    }

    let monetary_total = MonetaryTotal {
        line_extension_amount: MonetaryAmount::new(round_half_up(line_extension_sum, 2), currency),
        tax_exclusive_amount: MonetaryAmount::new(round_half_up(tax_exclusive, 2), currency),
        tax_inclusive_amount: MonetaryAmount::new(round_half_up(tax_inclusive, 2), currency),
        allowance_total_amount: (allowance_sum != Decimal::ZERO)
            .then(|| MonetaryAmount::new(round_half_up(allowance_sum, 2), currency)),
        charge_total_amount: (charge_sum != Decimal::ZERO)
            .then(|| MonetaryAmount::new(round_half_up(charge_sum, 2), currency)),
        prepaid_amount: (prepaid != Decimal::ZERO)
            .then(|| MonetaryAmount::new(round_half_up(prepaid, 2), currency)),
        payable_rounding_amount: payable_rounding
            .map(|r| MonetaryAmount::new(round_half_up(r, 2), currency)),
        payable_amount: MonetaryAmount::new(round_half_up(payable, 2), currency),
    };

    (tax_totals, monetary_total)
}

/// Builder for [`Party`].
pub struct PartyBuilder {
    endpoint: Option<ElectronicAddress>,
    identifications: Vec<Identifier>,
    name: String,
    address: Address,
    tax_registrations: Vec<TaxRegistration>,
    legal_name: Option<String>,
    company_id: Option<Identifier>,
    company_legal_form: Option<String>,
    contact: Option<Contact>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            endpoint: None,
            identifications: Vec::new(),
            name: name.into(),
            address,
            tax_registrations: Vec::new(),
            legal_name: None,
            company_id: None,
            company_legal_form: None,
            contact: None,
        }
    }

    pub fn endpoint(mut self, scheme_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint = Some(ElectronicAddress {
            scheme_id: scheme_id.into(),
            value: value.into(),
        });
        self
    }

    pub fn identification(mut self, id: Identifier) -> Self {
        self.identifications.push(id);
        self
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.tax_registrations.push(TaxRegistration {
            company_id: id.into(),
            scheme: TaxSchemeCode::Vat,
        });
        self
    }

    /// Local tax registration (the "FC" scheme), e.g. a national tax number.
    pub fn tax_number(mut self, id: impl Into<String>) -> Self {
        self.tax_registrations.push(TaxRegistration {
            company_id: id.into(),
            scheme: TaxSchemeCode::LocalTax,
        });
        self
    }

    /// Legal registration name, when it differs from the trading name.
    pub fn legal_name(mut self, name: impl Into<String>) -> Self {
        self.legal_name = Some(name.into());
        self
    }

    pub fn registration_id(mut self, id: Identifier) -> Self {
        self.company_id = Some(id);
        self
    }

    pub fn company_legal_form(mut self, form: impl Into<String>) -> Self {
        self.company_legal_form = Some(form.into());
        self
    }

    pub fn contact(
        mut self,
        name: Option<String>,
        telephone: Option<String>,
        email: Option<String>,
    ) -> Self {
        self.contact = Some(Contact {
            name,
            telephone,
            email,
        });
        self
    }

    pub fn build(self) -> Party {
        let registration_name = self.legal_name.unwrap_or_else(|| self.name.clone());
        Party {
            endpoint: self.endpoint,
            identifications: self.identifications,
            name: self.name,
            address: self.address,
            tax_registrations: self.tax_registrations,
            legal_entity: LegalEntity {
                registration_name,
                company_id: self.company_id,
                company_legal_form: self.company_legal_form,
            },
            contact: self.contact,
        }
    }
}

/// Builder for [`Address`].
pub struct AddressBuilder {
    street: Option<String>,
    additional_street: Option<String>,
    address_line: Option<String>,
    city: Option<String>,
    postal_zone: Option<String>,
    country_subentity: Option<String>,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_zone: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            additional_street: None,
            address_line: None,
            city: Some(city.into()),
            postal_zone: Some(postal_zone.into()),
            country_subentity: None,
            country_code: country_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn additional_street(mut self, street: impl Into<String>) -> Self {
        self.additional_street = Some(street.into());
        self
    }

    pub fn address_line(mut self, line: impl Into<String>) -> Self {
        self.address_line = Some(line.into());
        self
    }

    pub fn subentity(mut self, subentity: impl Into<String>) -> Self {
        self.country_subentity = Some(subentity.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            additional_street: self.additional_street,
            address_line: self.address_line,
            city: self.city,
            postal_zone: self.postal_zone,
            country_subentity: self.country_subentity,
            country_code: self.country_code,
        }
    }
}

/// Builder for [`InvoiceLine`].
///
/// `build()` computes the line extension amount from quantity, price, base
/// quantity and line-level allowances/charges, rounded half-up to 2 decimals.
pub struct LineBuilder {
    id: String,
    item_name: String,
    quantity: Decimal,
    unit_code: String,
    price: Decimal,
    currency: String,
    base_quantity: Option<BaseQuantity>,
    gross_price: Option<Decimal>,
    note: Option<String>,
    description: Option<String>,
    sellers_id: Option<String>,
    buyers_id: Option<String>,
    standard_id: Option<Identifier>,
    origin_country: Option<String>,
    classifications: Vec<CommodityClassification>,
    properties: Vec<ItemProperty>,
    tax_category: TaxCategory,
    accounting_cost: Option<String>,
    order_line_id: Option<String>,
    period: Option<Period>,
    allowance_charges: Vec<AllowanceCharge>,
}

impl LineBuilder {
    pub fn new(
        id: impl Into<String>,
        item_name: impl Into<String>,
        quantity: Decimal,
        unit_code: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            item_name: item_name.into(),
            quantity,
            unit_code: unit_code.into(),
            price,
            currency: "EUR".to_string(),
            base_quantity: None,
            gross_price: None,
            note: None,
            description: None,
            sellers_id: None,
            buyers_id: None,
            standard_id: None,
            origin_country: None,
            classifications: Vec::new(),
            properties: Vec::new(),
            tax_category: TaxCategory {
                code: TaxCategoryCode::StandardRate,
                percent: Some(Decimal::new(19, 0)),
            },
            accounting_cost: None,
            order_line_id: None,
            period: None,
            allowance_charges: Vec::new(),
        }
    }

    /// Currency for the line amounts; must match the invoice currency.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn tax(mut self, category: TaxCategoryCode, percent: Decimal) -> Self {
        self.tax_category = TaxCategory {
            code: category,
            percent: Some(percent),
        };
        self
    }

    /// Full tax category control, e.g. out-of-scope lines without a rate.
    pub fn tax_category(mut self, category: TaxCategory) -> Self {
        self.tax_category = category;
        self
    }

    pub fn base_quantity(mut self, value: Decimal, unit_code: Option<String>) -> Self {
        self.base_quantity = Some(BaseQuantity { value, unit_code });
        self
    }

    /// Gross price before discount; the difference to the net price is
    /// emitted as a price allowance.
    pub fn gross_price(mut self, price: Decimal) -> Self {
        self.gross_price = Some(price);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sellers_id(mut self, id: impl Into<String>) -> Self {
        self.sellers_id = Some(id.into());
        self
    }

    pub fn buyers_id(mut self, id: impl Into<String>) -> Self {
        self.buyers_id = Some(id.into());
        self
    }

    pub fn standard_id(mut self, id: Identifier) -> Self {
        self.standard_id = Some(id);
        self
    }

    pub fn origin_country(mut self, country_code: impl Into<String>) -> Self {
        self.origin_country = Some(country_code.into());
        self
    }

    pub fn classification(mut self, classification: CommodityClassification) -> Self {
        self.classifications.push(classification);
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(ItemProperty {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn accounting_cost(mut self, reference: impl Into<String>) -> Self {
        self.accounting_cost = Some(reference.into());
        self
    }

    pub fn order_line_id(mut self, id: impl Into<String>) -> Self {
        self.order_line_id = Some(id.into());
        self
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some(Period {
            start_date: Some(start),
            end_date: Some(end),
            description_code: None,
        });
        self
    }

    pub fn add_allowance(mut self, allowance: AllowanceCharge) -> Self {
        self.allowance_charges.push(AllowanceCharge {
            charge_indicator: false,
            ..allowance
        });
        self
    }

    pub fn add_charge(mut self, charge: AllowanceCharge) -> Self {
        self.allowance_charges.push(AllowanceCharge {
            charge_indicator: true,
            ..charge
        });
        self
    }

    pub fn build(self) -> InvoiceLine {
        let base_qty = self
            .base_quantity
            .as_ref()
            .map(|bq| bq.value)
            .unwrap_or(Decimal::ONE);
        let base = if base_qty.is_zero() {
            Decimal::ZERO
        } else {
            self.quantity * self.price / base_qty
        };
        let allowances: Decimal = self
            .allowance_charges
            .iter()
            .filter(|ac| !ac.charge_indicator)
            .map(|ac| ac.amount.value)
            .sum();
        let charges: Decimal = self
            .allowance_charges
            .iter()
            .filter(|ac| ac.charge_indicator)
            .map(|ac| ac.amount.value)
            .sum();
        let extension = round_half_up(base - allowances + charges, 2);

        let allowance = self.gross_price.and_then(|gross| {
            let discount = gross - self.price;
            (discount > Decimal::ZERO).then(|| PriceAllowance {
                amount: MonetaryAmount::new(discount, self.currency.clone()),
                base_amount: Some(MonetaryAmount::new(gross, self.currency.clone())),
            })
        });

        InvoiceLine {
            id: self.id,
            note: self.note,
            quantity: Quantity::new(self.quantity, self.unit_code),
            line_extension_amount: MonetaryAmount::new(extension, self.currency.clone()),
            accounting_cost: self.accounting_cost,
            period: self.period,
            order_line_id: self.order_line_id,
            object_identifier: None,
            allowance_charges: self.allowance_charges,
            item: Item {
                description: self.description,
                name: self.item_name,
                buyers_id: self.buyers_id,
                sellers_id: self.sellers_id,
                standard_id: self.standard_id,
                origin_country: self.origin_country,
                classifications: self.classifications,
                tax_category: self.tax_category,
                properties: self.properties,
            },
            price: Price {
                amount: MonetaryAmount::new(self.price, self.currency),
                base_quantity: self.base_quantity,
                allowance,
            },
        }
    }
}
