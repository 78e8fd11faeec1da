//! Bundled subsets of the standard code lists.
//!
//! Each table is a sorted slice of static strings searched with
//! `binary_search`. The full upstream lists run to thousands of entries;
//! these cover the subsets that actually occur in European e-invoicing.
//! Lists absent here are simply not answered by [`BuiltinLists`], so the
//! resolver reports them as unverified rather than wrong.
//!
//! [`BuiltinLists`]: super::BuiltinLists

use super::{lists, CodeStatus};

/// Look up `code` in the bundled table for `list`.
pub(super) fn lookup(list: &str, code: &str) -> CodeStatus {
    let table: &[&str] = match list {
        lists::ISO_4217 => CURRENCY_CODES,
        lists::ISO_3166 => COUNTRY_CODES,
        lists::UNECE_REC20 => UNIT_CODES,
        lists::UNTDID_1001 => INVOICE_TYPE_CODES,
        lists::UNTDID_4461 => PAYMENT_MEANS_CODES,
        lists::UNTDID_5305 => TAX_CATEGORY_CODES,
        lists::UNTDID_5189 => ALLOWANCE_REASON_CODES,
        lists::UNTDID_7161 => CHARGE_REASON_CODES,
        lists::EAS => EAS_SCHEME_CODES,
        _ => return CodeStatus::Unverified,
    };
    if table.binary_search(&code).is_ok() {
        CodeStatus::Valid
    } else {
        CodeStatus::Invalid
    }
}

/// Common ISO 4217 currency codes. Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", // UAE Dirham
    "AMD", // Armenian Dram
    "AUD", // Australian Dollar
    "BGN", // Bulgarian Lev
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "CZK", // Czech Koruna
    "DKK", // Danish Krone
    "EGP", // Egyptian Pound
    "EUR", // Euro
    "GBP", // Pound Sterling
    "GEL", // Georgian Lari
    "HKD", // Hong Kong Dollar
    "HUF", // Hungarian Forint
    "IDR", // Indonesian Rupiah
    "ILS", // Israeli Shekel
    "INR", // Indian Rupee
    "ISK", // Icelandic Krona
    "JPY", // Japanese Yen
    "KES", // Kenyan Shilling
    "KRW", // South Korean Won
    "KZT", // Kazakhstani Tenge
    "MXN", // Mexican Peso
    "MYR", // Malaysian Ringgit
    "NGN", // Nigerian Naira
    "NOK", // Norwegian Krone
    "NZD", // New Zealand Dollar
    "PHP", // Philippine Peso
    "PLN", // Polish Zloty
    "RON", // Romanian Leu
    "RSD", // Serbian Dinar
    "SAR", // Saudi Riyal
    "SEK", // Swedish Krona
    "SGD", // Singapore Dollar
    "THB", // Thai Baht
    "TRY", // Turkish Lira
    "TWD", // New Taiwan Dollar
    "UAH", // Ukrainian Hryvnia
    "USD", // US Dollar
    "VND", // Vietnamese Dong
    "ZAR", // South African Rand
];

/// ISO 3166-1 alpha-2 country codes (249 entries). Sorted for binary search.
static COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// Common UN/CEFACT Rec 20 unit codes. Sorted for binary search.
static UNIT_CODES: &[&str] = &[
    "ANN", // Year
    "BX",  // Box
    "C62", // One (piece/unit)
    "CLT", // Centilitre
    "CMK", // Square centimetre
    "CMT", // Centimetre
    "CS",  // Case
    "CT",  // Carton
    "DAY", // Day
    "DZN", // Dozen
    "EA",  // Each
    "GRM", // Gram
    "H87", // Piece
    "HAR", // Hectare
    "HLT", // Hectolitre
    "HUR", // Hour
    "KGM", // Kilogram
    "KMT", // Kilometre
    "KWH", // Kilowatt-hour
    "LM",  // Linear metre
    "LS",  // Lump sum
    "LTR", // Litre
    "MGM", // Milligram
    "MIN", // Minute
    "MLT", // Millilitre
    "MMT", // Millimetre
    "MON", // Month
    "MTK", // Square metre
    "MTQ", // Cubic metre
    "MTR", // Metre
    "MWH", // Megawatt-hour
    "NAR", // Number of articles
    "NPR", // Number of pairs
    "P1",  // Percent
    "PA",  // Packet
    "PK",  // Pack
    "PR",  // Pair
    "RO",  // Roll
    "SEC", // Second
    "SET", // Set
    "ST",  // Sheet
    "TNE", // Tonne (metric ton)
    "WEE", // Week
    "XBG", // Bag
    "XBX", // Box
    "XCT", // Carton
    "XPA", // Packet
    "XPK", // Package
    "XPX", // Pallet
    "XRO", // Roll
    "XSA", // Sack
    "XST", // Sheet
];

/// UNTDID 1001 document type codes in the invoice family.
/// Sorted for binary search.
static INVOICE_TYPE_CODES: &[&str] = &[
    "326", // Partial invoice
    "380", // Commercial invoice
    "381", // Credit note
    "383", // Debit note
    "384", // Corrected invoice
    "386", // Prepayment invoice
    "389", // Self-billed invoice
    "393", // Factored invoice
    "395", // Consignment invoice
    "575", // Insurer's invoice
    "623", // Forwarder's invoice
    "780", // Freight invoice
];

/// Common UNTDID 4461 payment means codes. Sorted for binary search.
static PAYMENT_MEANS_CODES: &[&str] = &[
    "1",  // Instrument not defined
    "10", // In cash
    "20", // Cheque
    "30", // Credit transfer
    "42", // Payment to bank account
    "48", // Bank card
    "49", // Direct debit
    "54", // Credit card
    "55", // Debit card
    "57", // Standing agreement
    "58", // SEPA credit transfer
    "59", // SEPA direct debit
    "68", // Online payment service
    "97", // Clearing between partners
];

/// UNTDID 5305 duty/tax/fee category codes used by EN 16931.
/// Sorted for binary search.
static TAX_CATEGORY_CODES: &[&str] = &[
    "AE", // VAT reverse charge
    "B",  // Transferred (VAT)
    "E",  // Exempt from tax
    "G",  // Free export item, tax not charged
    "K",  // VAT exempt (intra-community supply)
    "L",  // Canary Islands general indirect tax
    "M",  // Ceuta and Melilla taxes
    "O",  // Services outside scope of tax
    "S",  // Standard rate
    "Z",  // Zero rated goods
];

/// UNTDID 5189 allowance reason codes. Sorted for binary search.
static ALLOWANCE_REASON_CODES: &[&str] = &[
    "100", // Special agreement
    "102", // Fixed long term
    "103", // Temporary
    "104", // Standard
    "105", // Yearly turnover
    "41",  // Bonus for works ahead of schedule
    "42",  // Other bonus
    "60",  // Manufacturer's consumer discount
    "62",  // Due to military status
    "63",  // Due to work accident
    "64",  // Special agreement
    "65",  // Production error discount
    "66",  // New outlet discount
    "67",  // Sample discount
    "68",  // End-of-range discount
    "70",  // Incoterm discount
    "71",  // Point of sales threshold allowance
    "88",  // Material surcharge/deduction
    "95",  // Discount
];

/// UNTDID 7161 charge reason codes. Sorted for binary search.
static CHARGE_REASON_CODES: &[&str] = &[
    "AA",  // Advertising
    "AAA", // Telecommunication
    "AAC", // Technical modification
    "AAD", // Job-order production
    "AAE", // Outlays
    "AAF", // Off-premises
    "ABK", // Miscellaneous
    "ABL", // Additional packaging
    "ADR", // Other services
    "ADT", // Pick-up
    "AEW", // Environmental protection service
    "FC",  // Freight service
    "FI",  // Financing
    "FL",  // Flat rate
    "LA",  // Labelling
    "PC",  // Packing
    "TS",  // Testing
];

/// Common Electronic Address Scheme (EAS) codes for Peppol endpoints.
/// Sorted for binary search.
static EAS_SCHEME_CODES: &[&str] = &[
    "0002", // French SIRENE
    "0007", // Swedish organisation number
    "0009", // French SIRET
    "0037", // Finnish LY-tunnus
    "0060", // DUNS number
    "0088", // GS1 GLN
    "0096", // Danish P number
    "0097", // Italian FTI
    "0106", // Dutch KvK
    "0130", // EU directorates
    "0135", // SIA object identifiers
    "0142", // SECETI object identifiers
    "0151", // Australian ABN
    "0183", // Swiss UIDB
    "0184", // Danish DIGSTORG
    "0188", // Japanese corporate number
    "0190", // Dutch OIN
    "0191", // Estonian company code
    "0192", // Norwegian organisasjonsnummer
    "0193", // UBL.BE party identifier
    "0195", // Singapore UEN
    "0196", // Icelandic kennitala
    "0198", // Danish SE number
    "0199", // Legal entity identifier (LEI)
    "0200", // Lithuanian legal entity code
    "0201", // Italian IPA
    "0202", // Indice delle PA
    "0204", // German Leitweg-ID
    "0208", // Belgian enterprise number
    "0209", // GS1 identification keys
    "0210", // Italian Codice Fiscale
    "0211", // Italian Partita IVA
    "0212", // Finnish organization identifier
    "0213", // Finnish organization value add identifier
    "9901", // Danish CVR (legacy)
    "9906", // Italian VAT (legacy)
    "9907", // Italian CF (legacy)
    "9910", // Hungarian VAT
    "9913", // Business registers network
    "9914", // Austrian UID
    "9915", // Austrian Verwaltung
    "9918", // SWIFT BIC
    "9919", // Austrian Kennziffer
    "9920", // Spanish NIF
    "9922", // Andorran VAT
    "9925", // Belgian VAT
    "9926", // Bulgarian VAT
    "9927", // Swiss VAT
    "9928", // Cypriot VAT
    "9929", // Czech VAT
    "9930", // German VAT
    "9931", // Estonian VAT
    "9932", // UK VAT
    "9933", // Greek VAT
    "9934", // Croatian VAT
    "9935", // Irish VAT
    "9936", // Liechtenstein VAT
    "9937", // Lithuanian VAT
    "9938", // Luxembourg VAT
    "9939", // Latvian VAT
    "9940", // Monaco VAT
    "9941", // Montenegro VAT
    "9942", // Macedonian VAT
    "9943", // Maltese VAT
    "9944", // Dutch VAT
    "9945", // Polish VAT
    "9946", // Portuguese VAT
    "9947", // Romanian VAT
    "9948", // Serbian VAT
    "9949", // Slovenian VAT
    "9950", // Slovak VAT
    "9951", // San Marino VAT
    "9952", // Turkish VAT
    "9953", // Vatican VAT
    "9957", // French VAT
    "9959", // US EIN
];
