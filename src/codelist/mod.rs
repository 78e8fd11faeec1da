//! Pluggable code-list resolution.
//!
//! The EN 16931 enumeration rules check coded fields against external code
//! lists such as ISO 4217 or UNTDID 5305. Those lists are versioned
//! artifacts maintained on their own release cycles, so the rule engine
//! never hardcodes their contents; it consults a [`CodeListResolver`]
//! instead. A resolver that has no data for a list answers
//! [`CodeStatus::Unverified`], which turns the affected checks into
//! warnings rather than failures.
//!
//! [`BuiltinLists`] ships practical subsets of the standard lists;
//! [`TableResolver`] takes caller-supplied tables for deployments that
//! track the upstream releases themselves.

mod tables;

use std::collections::{HashMap, HashSet};

/// Names of the code lists consulted by the rule catalog.
///
/// A resolver is free to know additional lists; these are the ones the
/// bundled rules ask for.
pub mod lists {
    /// ISO 4217 currency codes.
    pub const ISO_4217: &str = "ISO4217";
    /// ISO 3166-1 alpha-2 country codes.
    pub const ISO_3166: &str = "ISO3166-1";
    /// UN/CEFACT Recommendation 20 unit codes.
    pub const UNECE_REC20: &str = "UNECERec20";
    /// UNTDID 1001 document type codes.
    pub const UNTDID_1001: &str = "UNTDID1001";
    /// UNTDID 4461 payment means codes.
    pub const UNTDID_4461: &str = "UNTDID4461";
    /// UNTDID 5305 duty/tax/fee category codes.
    pub const UNTDID_5305: &str = "UNTDID5305";
    /// UNTDID 5189 allowance reason codes.
    pub const UNTDID_5189: &str = "UNTDID5189";
    /// UNTDID 7161 charge reason codes.
    pub const UNTDID_7161: &str = "UNTDID7161";
    /// Peppol Electronic Address Scheme codes.
    pub const EAS: &str = "EAS";
}

/// Outcome of a single code lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeStatus {
    /// The list is known and contains the code.
    Valid,
    /// The list is known and does not contain the code.
    Invalid,
    /// The resolver has no data for this list.
    Unverified,
}

/// Code-list lookup used by the enumeration rules.
///
/// Implementations must be side-effect-free and answer every query:
/// an unrecognized list name yields [`CodeStatus::Unverified`], never
/// an error or a panic.
pub trait CodeListResolver: Send + Sync {
    /// Report whether `code` is a member of the named list.
    fn resolve(&self, list: &str, code: &str) -> CodeStatus;
}

impl<R: CodeListResolver + ?Sized> CodeListResolver for &R {
    fn resolve(&self, list: &str, code: &str) -> CodeStatus {
        (**self).resolve(list, code)
    }
}

/// Resolver with no configured lists; every lookup is
/// [`CodeStatus::Unverified`].
///
/// Useful when code-list currency is checked elsewhere and only the
/// structural and arithmetic rules matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLists;

impl CodeListResolver for NoLists {
    fn resolve(&self, _list: &str, _code: &str) -> CodeStatus {
        CodeStatus::Unverified
    }
}

/// Resolver backed by the bundled subsets of the standard lists.
///
/// The subsets cover the codes that occur in practice in European
/// e-invoicing. Deployments that need the complete upstream lists, or
/// lists the bundle omits, should use a [`TableResolver`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuiltinLists;

impl CodeListResolver for BuiltinLists {
    fn resolve(&self, list: &str, code: &str) -> CodeStatus {
        tables::lookup(list, code)
    }
}

/// Resolver over caller-supplied code tables.
///
/// Lists not inserted are reported as [`CodeStatus::Unverified`], so a
/// partial configuration degrades the affected checks to warnings
/// instead of producing false rejections.
///
/// # Example
///
/// ```
/// use peppol_billing::codelist::{lists, CodeListResolver, CodeStatus, TableResolver};
///
/// let resolver = TableResolver::new()
///     .with_list(lists::ISO_4217, ["EUR", "SEK", "NOK"]);
///
/// assert_eq!(resolver.resolve(lists::ISO_4217, "EUR"), CodeStatus::Valid);
/// assert_eq!(resolver.resolve(lists::ISO_4217, "XXX"), CodeStatus::Invalid);
/// assert_eq!(resolver.resolve(lists::UNECE_REC20, "C62"), CodeStatus::Unverified);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    tables: HashMap<String, HashSet<String>>,
}

impl TableResolver {
    /// Empty resolver; populate with [`with_list`](Self::with_list).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the table for `list`.
    pub fn with_list<I, S>(mut self, list: &str, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = codes.into_iter().map(Into::into).collect();
        self.tables.insert(list.to_string(), table);
        self
    }

    /// Names of the configured lists.
    pub fn configured_lists(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl CodeListResolver for TableResolver {
    fn resolve(&self, list: &str, code: &str) -> CodeStatus {
        match self.tables.get(list) {
            Some(table) if table.contains(code) => CodeStatus::Valid,
            Some(_) => CodeStatus::Invalid,
            None => CodeStatus::Unverified,
        }
    }
}
