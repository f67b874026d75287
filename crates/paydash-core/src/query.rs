//! Listing query model: equality filters and whitelisted sort clauses.
//!
//! Filters are kept as raw `(name, value)` pairs in a sorted map so that the
//! same filter set always iterates in the same order, regardless of how the
//! caller supplied it. Only whitelisted, non-empty filters are applied to a
//! store (see [`PaymentFilters::applied`]).
//!
//! Sort specs use the `[-]field[,[-]field...]` syntax. Every token is resolved
//! through [`SortField::from_name`]; unknown fields fall back to
//! [`SortClause::DEFAULT`] instead of producing an error.

use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Filters
// =============================================================================

/// Columns a listing may be filtered on by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Id,
    Status,
}

impl FilterField {
    /// Resolves a query-string name against the whitelist.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Status => "status",
        }
    }
}

/// Unordered set of filter pairs, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilters {
    pairs: BTreeMap<String, String>,
}

impl PaymentFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// All pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whitelisted pairs with a non-empty value, sorted by name.
    pub fn applied(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.iter().filter_map(|(name, value)| {
            if value.is_empty() {
                return None;
            }
            FilterField::from_name(name).map(|field| (field, value))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl<K, V> FromIterator<(K, V)> for PaymentFilters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Sortable payment fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Merchant,
    Status,
    /// Textually stored; must be ordered by numeric value.
    Amount,
    CreatedAt,
}

impl SortField {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "merchant" => Some(Self::Merchant),
            "status" => Some(Self::Status),
            "amount" => Some(Self::Amount),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    /// Column name as stored.
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Merchant => "merchant",
            Self::Status => "status",
            Self::Amount => "amount",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One resolved `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortClause {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortClause {
    /// Newest first.
    pub const DEFAULT: SortClause = SortClause {
        field: SortField::CreatedAt,
        direction: SortDirection::Desc,
    };

    /// Resolves a single `[-]field` token. Unknown fields yield [`Self::DEFAULT`].
    #[must_use]
    pub fn parse_token(token: &str) -> Self {
        let (name, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };

        match SortField::from_name(name.trim()) {
            Some(field) => Self { field, direction },
            None => Self::DEFAULT,
        }
    }
}

/// A parsed sort specification that remembers its raw text.
///
/// The raw text is what goes into cache keys; the clauses are what stores
/// apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    raw: String,
    clauses: Vec<SortClause>,
}

impl SortSpec {
    /// Parses a comma-separated `[-]field` list. Blank tokens are skipped; an
    /// empty result becomes `[SortClause::DEFAULT]`.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut clauses: Vec<SortClause> = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(SortClause::parse_token)
            .collect();

        if clauses.is_empty() {
            clauses.push(SortClause::DEFAULT);
        }

        Self { raw, clauses }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn clauses(&self) -> &[SortClause] {
        &self.clauses
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::parse("")
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// Query
// =============================================================================

/// Everything a store needs to run a payments listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentListQuery {
    pub filters: PaymentFilters,
    pub sort: SortSpec,
}

impl PaymentListQuery {
    #[must_use]
    pub fn new(filters: PaymentFilters, sort: SortSpec) -> Self {
        Self { filters, sort }
    }
}
