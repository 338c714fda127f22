//! Filter translation - chips to column filters and a global predicate
//!
//! Semantics:
//! - Column chips: exact match on the stringified field,
//!   OR within a column, AND across columns.
//! - Global chips: lowercase terms, each must be a case-insensitive substring
//!   of at least one field (AND across terms, OR across fields).
//! - No chips: no column restriction, predicate always passes.
//!
//! Translation is a pure function of the chip sequence.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::suggest::Suggestion;
use crate::value::Row;

/// Column name → accepted values (exact match).
pub type ColumnFilters = FxHashMap<String, FxHashSet<String>>;

/// Check a row against column filters.
///
/// A row missing a filtered column fails that column.
pub fn passes_columns(filters: &ColumnFilters, row: &Row) -> bool {
    filters.iter().all(|(column, accepted)| {
        row.display(column)
            .map_or(false, |value| accepted.contains(&value))
    })
}

// =============================================================================
// GlobalPredicate
// =============================================================================

/// Row predicate built from global terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPredicate {
    /// Already lowercased
    terms: Vec<String>,
}

impl GlobalPredicate {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms: terms.into_iter().map(|term| term.to_lowercase()).collect(),
        }
    }

    /// Predicate that passes every row.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn passes(&self, row: &Row) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let haystacks: Vec<String> = row
            .fields()
            .map(|(_, value)| value.display_string().to_lowercase())
            .collect();
        self.terms
            .iter()
            .all(|term| haystacks.iter().any(|field| field.contains(term.as_str())))
    }
}

// =============================================================================
// FilterSpec
// =============================================================================

/// Derived filter specification for a chip sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub column_filters: ColumnFilters,
    /// Lowercase global terms, in chip order
    pub global_terms: Vec<String>,
}

impl FilterSpec {
    pub fn predicate(&self) -> GlobalPredicate {
        GlobalPredicate::new(self.global_terms.clone())
    }

    /// Column filters AND global predicate.
    pub fn passes(&self, row: &Row) -> bool {
        passes_columns(&self.column_filters, row) && self.predicate().passes(row)
    }

    /// No restriction of any kind.
    pub fn is_empty(&self) -> bool {
        self.column_filters.is_empty() && self.global_terms.is_empty()
    }
}

/// Translate chips into a filter specification.
pub fn translate(chips: &[Suggestion]) -> FilterSpec {
    let mut spec = FilterSpec::default();
    for chip in chips {
        match chip {
            Suggestion::Column { column, value } => {
                spec.column_filters
                    .entry(column.clone())
                    .or_default()
                    .insert(value.clone());
            }
            Suggestion::Global(text) => spec.global_terms.push(text.to_lowercase()),
        }
    }
    spec
}
