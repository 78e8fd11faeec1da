use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default BT-24 customization identifier: EN 16931 compliant, Peppol BIS
/// Billing 3.0 restricted.
pub const BIS_CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0";

/// Default BT-23 business process identifier for Peppol BIS Billing 3.0.
pub const BIS_PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

/// A monetary value carried together with its ISO 4217 currency code.
///
/// Amounts are never bare numbers; cross-currency arithmetic must be explicit.
/// Totals and line extension amounts are constrained to at most 2 fractional
/// digits — the codec rejects anything finer as a data-integrity defect.
/// Unit prices are exempt from that cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    /// Numeric value, exact decimal.
    pub value: Decimal,
    /// ISO 4217 alpha-3 currency code (e.g. "EUR").
    pub currency: String,
}

impl MonetaryAmount {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Whether the value fits in 2 fractional digits (ignoring trailing zeros).
    pub fn has_standard_scale(&self) -> bool {
        self.value.normalize().scale() <= 2
    }
}

/// BT-129/BT-130: a numeric value with a mandatory UNECE Rec 20 unit code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Decimal,
    /// UNECE Rec 20 unit of measure (e.g. "C62" piece, "HUR" hour).
    pub unit_code: String,
}

impl Quantity {
    pub fn new(value: Decimal, unit_code: impl Into<String>) -> Self {
        Self {
            value,
            unit_code: unit_code.into(),
        }
    }
}

/// A scheme-qualified identifier (`@schemeID` in UBL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub value: String,
    pub scheme_id: Option<String>,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scheme_id: None,
        }
    }

    pub fn with_scheme(value: impl Into<String>, scheme_id: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scheme_id: Some(scheme_id.into()),
        }
    }
}

/// BG-0: Invoice — the top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-24: Specification identifier.
    pub customization_id: String,
    /// BT-23: Business process type.
    pub profile_id: String,
    /// BT-1: Invoice number.
    pub id: String,
    /// BT-2: Invoice issue date.
    pub issue_date: NaiveDate,
    /// BT-9: Payment due date.
    pub due_date: Option<NaiveDate>,
    /// BT-3: Invoice type code (UNTDID 1001).
    pub type_code: InvoiceTypeCode,
    /// BT-22: Invoice notes.
    pub notes: Vec<String>,
    /// BT-7: Value added tax point date.
    pub tax_point_date: Option<NaiveDate>,
    /// BT-5: Invoice currency code (ISO 4217).
    pub currency_code: String,
    /// BT-6: VAT accounting currency code, if VAT is booked in another currency.
    pub tax_currency_code: Option<String>,
    /// BT-19: Buyer accounting reference.
    pub accounting_cost: Option<String>,
    /// BT-10: Buyer reference (e.g. purchaser routing ID).
    pub buyer_reference: Option<String>,
    /// BG-14: Invoicing period.
    pub invoice_period: Option<Period>,
    /// BT-13/BT-14: Purchase and sales order references.
    pub order_reference: Option<OrderReference>,
    /// BG-3: Preceding invoice references.
    pub billing_references: Vec<BillingReference>,
    /// BT-16: Despatch advice reference.
    pub despatch_document_reference: Option<String>,
    /// BT-15: Receipt advice reference.
    pub receipt_document_reference: Option<String>,
    /// BT-17: Tender or lot reference.
    pub originator_document_reference: Option<String>,
    /// BT-12: Contract reference.
    pub contract_document_reference: Option<String>,
    /// BG-24: Additional supporting documents.
    pub additional_document_references: Vec<AdditionalDocumentReference>,
    /// BT-11: Project reference.
    pub project_reference: Option<String>,
    /// BG-4: Seller.
    pub supplier: Party,
    /// BG-7: Buyer.
    pub customer: Party,
    /// BG-10: Payee, when different from the seller.
    pub payee: Option<Party>,
    /// BG-11: Seller tax representative.
    pub tax_representative: Option<Party>,
    /// BG-13: Delivery information.
    pub delivery: Option<Delivery>,
    /// BG-16: Payment instructions.
    pub payment_means: Vec<PaymentMeans>,
    /// BT-20: Payment terms.
    pub payment_terms: Option<PaymentTerms>,
    /// BG-20/BG-21: Document-level allowances and charges.
    pub allowance_charges: Vec<AllowanceCharge>,
    /// BG-22: VAT totals; one in the document currency (with subtotals),
    /// optionally a second in the tax accounting currency.
    pub tax_totals: Vec<TaxTotal>,
    /// BG-22: Document totals.
    pub monetary_total: MonetaryTotal,
    /// BG-25: Invoice lines.
    pub lines: Vec<InvoiceLine>,
}

/// BG-14 / BG-26: a date interval.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    /// BT-73 / BT-134: Period start date.
    pub start_date: Option<NaiveDate>,
    /// BT-74 / BT-135: Period end date.
    pub end_date: Option<NaiveDate>,
    /// BT-8: VAT point date code (UNTDID 2005 subset: 3, 35, 432).
    pub description_code: Option<String>,
}

/// BT-13/BT-14: Order reference.
///
/// UBL makes the purchase order ID mandatory inside this element; when only a
/// sales order reference exists, the documented fallback is the literal "NA".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReference {
    /// BT-13: Purchase order reference, issued by the buyer.
    pub id: String,
    /// BT-14: Sales order reference, issued by the seller.
    pub sales_order_id: Option<String>,
}

/// BG-3: Preceding invoice reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReference {
    /// BT-25: Preceding invoice number.
    pub id: String,
    /// BT-26: Preceding invoice issue date. Shall be provided when the
    /// preceding invoice number alone is not unique.
    pub issue_date: Option<NaiveDate>,
}

/// BG-24: Additional supporting document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdditionalDocumentReference {
    /// BT-122: Supporting document reference; BT-18 invoiced-object
    /// identifier when `document_type_code` is "130".
    pub id: String,
    /// BT-18 scheme identifier.
    pub scheme_id: Option<String>,
    /// "130" marks the reference as an invoiced-object identifier.
    pub document_type_code: Option<String>,
    /// BT-123: Supporting document description.
    pub description: Option<String>,
    /// BT-125: Embedded attachment.
    pub attachment: Option<Attachment>,
    /// BT-124: External document location.
    pub external_uri: Option<String>,
}

/// BT-125: Base64 attachment content with media metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64-encoded content, kept opaque.
    pub content: String,
    pub mime_code: String,
    pub filename: String,
}

/// BG-4 / BG-7 / BG-10 / BG-11: a party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// BT-34 / BT-49: Electronic (Peppol) address.
    pub endpoint: Option<ElectronicAddress>,
    /// BT-29 / BT-46: Party identifiers.
    pub identifications: Vec<Identifier>,
    /// BT-28 / BT-45: Trading name. Falls back to the registration name in
    /// documents that omit `PartyName`.
    pub name: String,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BT-31/BT-32 / BT-48: Tax registrations (VAT and local tax).
    pub tax_registrations: Vec<TaxRegistration>,
    /// BT-27 / BT-44: Legal entity.
    pub legal_entity: LegalEntity,
    /// BG-6 / BG-9: Contact details.
    pub contact: Option<Contact>,
}

impl Party {
    /// BT-31 / BT-48: the VAT identifier among the tax registrations.
    pub fn vat_id(&self) -> Option<&str> {
        self.tax_registrations
            .iter()
            .find(|r| r.scheme == TaxSchemeCode::Vat)
            .map(|r| r.company_id.as_str())
    }
}

/// BT-34 / BT-49: electronic address with mandatory EAS scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicAddress {
    /// EAS scheme identifier (e.g. "0088" GLN, "9930" DE VAT).
    pub scheme_id: String,
    pub value: String,
}

/// One `PartyTaxScheme` registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRegistration {
    /// BT-31/BT-32 / BT-48: Registration identifier.
    pub company_id: String,
    /// Which scheme the registration belongs to.
    pub scheme: TaxSchemeCode,
}

/// Tax scheme discriminator for party registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxSchemeCode {
    /// "VAT" — a VAT identifier.
    Vat,
    /// "FC" — a local tax registration (e.g. national tax number).
    LocalTax,
}

impl TaxSchemeCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vat => "VAT",
            Self::LocalTax => "FC",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "FC" => Self::LocalTax,
            _ => Self::Vat,
        }
    }
}

/// BT-27 / BT-44: legal entity registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalEntity {
    /// BT-27 / BT-44: Full legal name.
    pub registration_name: String,
    /// BT-30 / BT-47: Legal registration identifier (scheme-qualified).
    pub company_id: Option<Identifier>,
    /// BT-33: Additional legal information (e.g. share capital).
    pub company_legal_form: Option<String>,
}

/// BG-5 / BG-8: postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50: Street and house number.
    pub street: Option<String>,
    /// BT-36 / BT-51: Additional street line.
    pub additional_street: Option<String>,
    /// BT-162: Third address line.
    pub address_line: Option<String>,
    /// BT-37 / BT-52: City.
    pub city: Option<String>,
    /// BT-38 / BT-53: Postal code.
    pub postal_zone: Option<String>,
    /// BT-39 / BT-54: Country subdivision.
    pub country_subentity: Option<String>,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
}

/// BG-6 / BG-9: contact details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    /// BT-41 / BT-56: Contact point.
    pub name: Option<String>,
    /// BT-42 / BT-57: Telephone.
    pub telephone: Option<String>,
    /// BT-43 / BT-58: Email.
    pub email: Option<String>,
}

/// BG-13: delivery information.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delivery {
    /// BT-72: Actual delivery date.
    pub actual_delivery_date: Option<NaiveDate>,
    /// BT-71: Deliver-to location identifier.
    pub location_id: Option<Identifier>,
    /// BG-15: Deliver-to address.
    pub address: Option<Address>,
    /// BT-70: Deliver-to party name.
    pub party_name: Option<String>,
}

/// BG-16: payment instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMeans {
    /// BT-81: Payment means type code (UNTDID 4461).
    pub code: PaymentMeansCode,
    /// BT-82: Payment means text.
    pub name: Option<String>,
    /// BT-83: Remittance information.
    pub payment_id: Option<String>,
    /// BG-18: Payment card information.
    pub card_account: Option<CardAccount>,
    /// BG-17: Credit transfer target account.
    pub payee_account: Option<PayeeAccount>,
    /// BG-19: Direct debit mandate.
    pub mandate: Option<PaymentMandate>,
}

/// BG-18: payment card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAccount {
    /// BT-87: Masked primary account number.
    pub primary_account_number: String,
    /// Card network. Syntax-required by UBL; "NA" when unknown.
    pub network_id: String,
    /// BT-88: Card holder name.
    pub holder_name: Option<String>,
}

/// BG-17: credit transfer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeAccount {
    /// BT-84: Account identifier (IBAN or BBAN).
    pub id: String,
    /// BT-85: Account name.
    pub name: Option<String>,
    /// BT-86: Payment service provider identifier (BIC).
    pub institution_branch_id: Option<String>,
}

/// BG-19: direct debit mandate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentMandate {
    /// BT-89: Mandate reference identifier.
    pub id: Option<String>,
    /// BT-91: Debited account identifier.
    pub payer_account_id: Option<String>,
}

/// BT-20: payment terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub note: String,
}

/// BG-20/BG-21 (document level) and BG-27/BG-28 (line level).
///
/// `charge_indicator` discriminates: `false` is an allowance (discount),
/// `true` a charge. The tax category is present at document level only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceCharge {
    /// BT-97-00/BT-104-00: false = allowance, true = charge.
    pub charge_indicator: bool,
    /// BT-98 / BT-105: Reason code (UNTDID 5189 for allowances, 7161 for charges).
    pub reason_code: Option<String>,
    /// BT-97 / BT-104: Reason text.
    pub reason: Option<String>,
    /// BT-94 / BT-101: Percentage applied to the base amount.
    pub multiplier_factor: Option<Decimal>,
    /// BT-92 / BT-99: Allowance/charge amount.
    pub amount: MonetaryAmount,
    /// BT-93 / BT-100: Base amount the percentage applies to.
    pub base_amount: Option<MonetaryAmount>,
    /// BT-95/BT-96 / BT-102/BT-103: VAT category; document level only.
    pub tax_category: Option<TaxCategory>,
}

/// A VAT category code with its rate, as attached to lines, subtotals and
/// document-level allowances/charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCategory {
    /// UNTDID 5305 category code.
    pub code: TaxCategoryCode,
    /// VAT rate percentage. Absent for out-of-scope supplies.
    pub percent: Option<Decimal>,
}

/// UNTDID 5305 — VAT category codes (EN 16931 subset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategoryCode {
    /// S — Standard rate.
    StandardRate,
    /// Z — Zero rated.
    ZeroRated,
    /// E — Exempt from tax.
    Exempt,
    /// AE — VAT reverse charge.
    ReverseCharge,
    /// K — Intra-community supply (VAT exempt).
    IntraCommunity,
    /// G — Export outside the EU (free export item).
    Export,
    /// O — Services outside scope of tax.
    OutOfScope,
    /// Any other UNTDID 5305 code (e.g. "L", "M").
    Other(String),
}

impl TaxCategoryCode {
    pub fn code(&self) -> &str {
        match self {
            Self::StandardRate => "S",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::ReverseCharge => "AE",
            Self::IntraCommunity => "K",
            Self::Export => "G",
            Self::OutOfScope => "O",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "S" => Self::StandardRate,
            "Z" => Self::ZeroRated,
            "E" => Self::Exempt,
            "AE" => Self::ReverseCharge,
            "K" => Self::IntraCommunity,
            "G" => Self::Export,
            "O" => Self::OutOfScope,
            other => Self::Other(other.to_string()),
        }
    }

    /// Categories whose VAT breakdown must state an exemption reason.
    pub fn needs_exemption_reason(&self) -> bool {
        matches!(
            self,
            Self::Exempt | Self::ReverseCharge | Self::IntraCommunity | Self::Export | Self::OutOfScope
        )
    }
}

/// UNTDID 1001 — document type codes (invoice family).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380 — Commercial invoice.
    Commercial,
    /// 381 — Credit note.
    CreditNote,
    /// 384 — Corrected invoice.
    Corrected,
    /// 386 — Prepayment invoice.
    Prepayment,
    /// 326 — Partial invoice.
    Partial,
    /// Any other UNTDID 1001 code.
    Other(String),
}

impl InvoiceTypeCode {
    pub fn code(&self) -> &str {
        match self {
            Self::Commercial => "380",
            Self::CreditNote => "381",
            Self::Corrected => "384",
            Self::Prepayment => "386",
            Self::Partial => "326",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "380" => Self::Commercial,
            "381" => Self::CreditNote,
            "384" => Self::Corrected,
            "386" => Self::Prepayment,
            "326" => Self::Partial,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Default for InvoiceTypeCode {
    fn default() -> Self {
        Self::Commercial
    }
}

/// UNTDID 4461 — payment means type codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMeansCode {
    /// 10 — In cash.
    InCash,
    /// 20 — Cheque.
    Cheque,
    /// 30 — Credit transfer.
    CreditTransfer,
    /// 48 — Bank card.
    BankCard,
    /// 49 — Direct debit.
    DirectDebit,
    /// 58 — SEPA credit transfer.
    SepaCreditTransfer,
    /// 59 — SEPA direct debit.
    SepaDirectDebit,
    /// Any other UNTDID 4461 code.
    Other(String),
}

impl PaymentMeansCode {
    pub fn code(&self) -> &str {
        match self {
            Self::InCash => "10",
            Self::Cheque => "20",
            Self::CreditTransfer => "30",
            Self::BankCard => "48",
            Self::DirectDebit => "49",
            Self::SepaCreditTransfer => "58",
            Self::SepaDirectDebit => "59",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "10" => Self::InCash,
            "20" => Self::Cheque,
            "30" => Self::CreditTransfer,
            "48" => Self::BankCard,
            "49" => Self::DirectDebit,
            "58" => Self::SepaCreditTransfer,
            "59" => Self::SepaDirectDebit,
            other => Self::Other(other.to_string()),
        }
    }

    /// Direct debit variants require a mandate reference.
    pub fn is_direct_debit(&self) -> bool {
        matches!(self, Self::DirectDebit | Self::SepaDirectDebit)
    }
}

/// BG-22: one VAT total, with per-category subtotals on the
/// document-currency instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTotal {
    /// BT-110 / BT-111: Total VAT amount.
    pub tax_amount: MonetaryAmount,
    /// BG-23: VAT breakdown per category and rate.
    pub subtotals: Vec<TaxSubtotal>,
}

/// BG-23: VAT breakdown entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    /// BT-116: Sum of taxable amounts subject to this category and rate.
    pub taxable_amount: MonetaryAmount,
    /// BT-117: VAT amount for this category and rate.
    pub tax_amount: MonetaryAmount,
    /// BT-118/BT-119: Category and rate.
    pub category: TaxCategory,
    /// BT-121: VAT exemption reason code (VATEX).
    pub exemption_reason_code: Option<String>,
    /// BT-120: VAT exemption reason text.
    pub exemption_reason: Option<String>,
}

/// BG-22: document totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryTotal {
    /// BT-106: Sum of line extension amounts.
    pub line_extension_amount: MonetaryAmount,
    /// BT-109: Total without VAT.
    pub tax_exclusive_amount: MonetaryAmount,
    /// BT-112: Total with VAT.
    pub tax_inclusive_amount: MonetaryAmount,
    /// BT-107: Sum of document-level allowances.
    pub allowance_total_amount: Option<MonetaryAmount>,
    /// BT-108: Sum of document-level charges.
    pub charge_total_amount: Option<MonetaryAmount>,
    /// BT-113: Prepaid amount.
    pub prepaid_amount: Option<MonetaryAmount>,
    /// BT-114: Rounding of the payable amount.
    pub payable_rounding_amount: Option<MonetaryAmount>,
    /// BT-115: Amount due for payment.
    pub payable_amount: MonetaryAmount,
}

/// BG-25: invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// BT-126: Line identifier, unique within the document.
    pub id: String,
    /// BT-127: Line note.
    pub note: Option<String>,
    /// BT-129/BT-130: Invoiced quantity with unit.
    pub quantity: Quantity,
    /// BT-131: Line net amount.
    pub line_extension_amount: MonetaryAmount,
    /// BT-133: Line accounting reference.
    pub accounting_cost: Option<String>,
    /// BG-26: Line invoicing period.
    pub period: Option<Period>,
    /// BT-132: Referenced purchase order line.
    pub order_line_id: Option<String>,
    /// BT-128: Invoiced-object identifier (emitted as a DocumentReference
    /// with type code "130").
    pub object_identifier: Option<Identifier>,
    /// BG-27/BG-28: Line allowances and charges.
    pub allowance_charges: Vec<AllowanceCharge>,
    /// BG-31: Item information.
    pub item: Item,
    /// BG-29: Price details.
    pub price: Price,
}

/// BG-31: item information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// BT-154: Item description.
    pub description: Option<String>,
    /// BT-153: Item name.
    pub name: String,
    /// BT-156: Buyer's item identifier.
    pub buyers_id: Option<String>,
    /// BT-155: Seller's item identifier.
    pub sellers_id: Option<String>,
    /// BT-157: Standard item identifier (scheme-qualified, e.g. 0160 GTIN).
    pub standard_id: Option<Identifier>,
    /// BT-159: Item country of origin.
    pub origin_country: Option<String>,
    /// BT-158: Item classification codes.
    pub classifications: Vec<CommodityClassification>,
    /// BT-151/BT-152: Line VAT category and rate.
    pub tax_category: TaxCategory,
    /// BG-32: Item attributes.
    pub properties: Vec<ItemProperty>,
}

/// BT-158: item classification identifier with its list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityClassification {
    pub code: String,
    /// Classification list (UNTDID 7143, e.g. "SRV", "STI").
    pub list_id: String,
    pub list_version_id: Option<String>,
}

/// BG-32: name/value item attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProperty {
    /// BT-160: Attribute name.
    pub name: String,
    /// BT-161: Attribute value.
    pub value: String,
}

/// BG-29: price details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// BT-146: Item net price. May carry more than 2 fractional digits.
    pub amount: MonetaryAmount,
    /// BT-149/BT-150: Number of item units the price applies to.
    pub base_quantity: Option<BaseQuantity>,
    /// BT-147/BT-148: Price discount with its gross base.
    pub allowance: Option<PriceAllowance>,
}

/// BT-149: price base quantity; the unit code is optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseQuantity {
    pub value: Decimal,
    pub unit_code: Option<String>,
}

/// BT-147/BT-148: discount folded into the item net price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAllowance {
    /// BT-147: Discount amount.
    pub amount: MonetaryAmount,
    /// BT-148: Gross price before the discount.
    pub base_amount: Option<MonetaryAmount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_category_codes_round_trip() {
        for code in ["S", "Z", "E", "AE", "K", "G", "O", "L", "M"] {
            assert_eq!(TaxCategoryCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn payment_means_codes_round_trip() {
        for code in ["10", "20", "30", "48", "49", "58", "59", "97"] {
            assert_eq!(PaymentMeansCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn type_codes_round_trip() {
        for code in ["380", "381", "384", "386", "326", "393"] {
            assert_eq!(InvoiceTypeCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn direct_debit_detection() {
        assert!(PaymentMeansCode::DirectDebit.is_direct_debit());
        assert!(PaymentMeansCode::SepaDirectDebit.is_direct_debit());
        assert!(!PaymentMeansCode::SepaCreditTransfer.is_direct_debit());
    }

    #[test]
    fn standard_scale_detection() {
        use rust_decimal_macros::dec;
        assert!(MonetaryAmount::new(dec!(100.50), "EUR").has_standard_scale());
        assert!(MonetaryAmount::new(dec!(100.500), "EUR").has_standard_scale());
        assert!(!MonetaryAmount::new(dec!(100.505), "EUR").has_standard_scale());
    }

    #[test]
    fn vat_id_lookup() {
        let party = Party {
            endpoint: None,
            identifications: vec![],
            name: "ACME".into(),
            address: Address {
                street: None,
                additional_street: None,
                address_line: None,
                city: None,
                postal_zone: None,
                country_subentity: None,
                country_code: "DE".into(),
            },
            tax_registrations: vec![
                TaxRegistration {
                    company_id: "123/456/789".into(),
                    scheme: TaxSchemeCode::LocalTax,
                },
                TaxRegistration {
                    company_id: "DE123456789".into(),
                    scheme: TaxSchemeCode::Vat,
                },
            ],
            legal_entity: LegalEntity {
                registration_name: "ACME GmbH".into(),
                company_id: None,
                company_legal_form: None,
            },
            contact: None,
        };
        assert_eq!(party.vat_id(), Some("DE123456789"));
    }
}
