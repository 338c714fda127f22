//! Suggestion engine
//!
//! Turns partial input into (column, value) candidates drawn from the value
//! index. Matching is a plain case-insensitive substring test: no scoring,
//! no ranking, no truncation. Output is grouped by column (index order) and
//! then by value, but callers should only rely on "grouped by column".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::ValueIndex;

/// Reserved column name for global chips at the serialization boundary.
pub const GLOBAL_COLUMN: &str = "global";

/// A proposed (or committed) selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SuggestionRecord", into = "SuggestionRecord")]
pub enum Suggestion {
    /// Exact value of a real column
    Column { column: String, value: String },
    /// Raw free text matched against every field
    Global(String),
}

impl Suggestion {
    pub fn column(column: impl Into<String>, value: impl Into<String>) -> Self {
        Suggestion::Column { column: column.into(), value: value.into() }
    }

    pub fn global(value: impl Into<String>) -> Self {
        Suggestion::Global(value.into())
    }

    /// Column name, or [`GLOBAL_COLUMN`] for global text.
    pub fn column_name(&self) -> &str {
        match self {
            Suggestion::Column { column, .. } => column,
            Suggestion::Global(_) => GLOBAL_COLUMN,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Suggestion::Column { value, .. } => value,
            Suggestion::Global(value) => value,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Suggestion::Global(_))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Column { column, value } => write!(f, "{column}: {value}"),
            Suggestion::Global(value) => write!(f, "\"{value}\""),
        }
    }
}

/// Wire shape: `{ "column": ..., "value": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuggestionRecord {
    column: String,
    value: String,
}

impl From<SuggestionRecord> for Suggestion {
    fn from(record: SuggestionRecord) -> Self {
        if record.column == GLOBAL_COLUMN {
            Suggestion::Global(record.value)
        } else {
            Suggestion::Column { column: record.column, value: record.value }
        }
    }
}

impl From<Suggestion> for SuggestionRecord {
    fn from(suggestion: Suggestion) -> Self {
        match suggestion {
            Suggestion::Column { column, value } => SuggestionRecord { column, value },
            Suggestion::Global(value) => SuggestionRecord {
                column: GLOBAL_COLUMN.to_string(),
                value,
            },
        }
    }
}

/// Compute suggestions for `input` against the index.
///
/// Empty input returns nothing. That is distinct from "typed but no match",
/// which also returns nothing but is what makes free-text commit possible.
pub fn suggest(input: &str, index: &ValueIndex) -> Vec<Suggestion> {
    if input.is_empty() {
        return Vec::new();
    }

    let needle = input.to_lowercase();
    let matches: Vec<Suggestion> = index
        .iter()
        .filter(|(_, value)| value.to_lowercase().contains(&needle))
        .map(|(column, value)| Suggestion::column(column, value))
        .collect();

    log::trace!("suggest {:?}: {} match(es)", input, matches.len());
    matches
}

/// True when non-empty input has no match anywhere in the index.
pub fn is_free_text(input: &str, index: &ValueIndex) -> bool {
    !input.is_empty() && suggest(input, index).is_empty()
}

/// Suggestions sharing a column, for grouped display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionGroup {
    pub column: String,
    pub values: Vec<String>,
}

/// Group suggestions by column name, keeping first-seen column order.
pub fn group_by_column(suggestions: &[Suggestion]) -> Vec<SuggestionGroup> {
    let mut groups: Vec<SuggestionGroup> = Vec::new();
    for suggestion in suggestions {
        let column = suggestion.column_name();
        match groups.iter_mut().find(|group| group.column == column) {
            Some(group) => group.values.push(suggestion.value().to_string()),
            None => groups.push(SuggestionGroup {
                column: column.to_string(),
                values: vec![suggestion.value().to_string()],
            }),
        }
    }
    groups
}
