use thiserror::Error;

/// Data-integrity errors raised by the codec.
///
/// These cover everything that makes a document unreadable as a model (or a
/// model unwritable as a document): malformed XML, missing required elements
/// or attributes, cardinality violations, unparseable scalars, and monetary
/// totals carrying more than two fractional digits. They are disjoint from
/// business-rule [`Violation`](crate::rules::Violation)s, which never abort a
/// call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StructuralError {
    /// The input is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// The input is not valid UTF-8.
    #[error("document is not valid UTF-8")]
    Encoding,

    /// The root element is not a UBL Invoice.
    #[error("unexpected root element '{0}', expected Invoice")]
    UnexpectedRoot(String),

    /// A required element is absent.
    #[error("{path}: required element missing")]
    MissingElement { path: String },

    /// A required attribute is absent (e.g. `currencyID`, `unitCode`).
    #[error("{path}: required attribute '{attribute}' missing")]
    MissingAttribute { path: String, attribute: String },

    /// An element occurs more often than its cardinality allows.
    #[error("{path}: element occurs more than once")]
    Cardinality { path: String },

    /// A numeric field could not be parsed as a decimal.
    #[error("{path}: '{value}' is not a valid decimal")]
    InvalidDecimal { path: String, value: String },

    /// A date field does not match `YYYY-MM-DD`.
    #[error("{path}: '{value}' is not a valid calendar date (expected YYYY-MM-DD)")]
    InvalidDate { path: String, value: String },

    /// A total or line extension amount carries more than 2 fractional digits.
    #[error("{path}: amount '{value}' has more than 2 fractional digits")]
    AmountScale { path: String, value: String },
}

/// Errors raised by the producer-side builders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A mandatory builder input was never supplied.
    #[error("{0} is required")]
    Missing(&'static str),

    /// An invoice needs at least one line.
    #[error("invoice has no lines")]
    NoLines,

    /// Line count exceeds the supported maximum.
    #[error("invoice has {0} lines, exceeding the supported maximum")]
    TooManyLines(usize),

    /// Note count exceeds the supported maximum.
    #[error("invoice has {0} notes, exceeding the supported maximum")]
    TooManyNotes(usize),

    /// A mandatory builder input was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A builder input exceeds its length limit.
    #[error("{field} exceeds {limit} characters")]
    FieldTooLong { field: &'static str, limit: usize },
}
