//! Value Index - distinct values per column over the visible rows
//!
//! The index is a pure function of the visible row set. It is rebuilt from
//! scratch on every visible-rows change and never patched in place, so it can
//! never hold a value from a row that is currently hidden.
//!
//! Storage is case-sensitive ("Tech" and "tech" are distinct values);
//! case-insensitive matching is the suggestion engine's job.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Row;

/// Entry for display: a distinct value and how many visible rows hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueEntry {
    pub value: String,
    pub count: usize,
}

/// Mapping column name → distinct stringified values (with row counts).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueIndex {
    columns: BTreeMap<String, BTreeMap<String, usize>>,
    row_count: usize,
}

impl ValueIndex {
    /// Build the index from the visible rows.
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let mut columns: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut row_count = 0;

        for row in rows {
            row_count += 1;
            for (column, value) in row.fields() {
                *columns
                    .entry(column.to_string())
                    .or_default()
                    .entry(value.display_string())
                    .or_insert(0) += 1;
            }
        }

        Self { columns, row_count }
    }

    /// Number of rows the index was built from.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names (sorted).
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn contains(&self, column: &str, value: &str) -> bool {
        self.columns
            .get(column)
            .map_or(false, |values| values.contains_key(value))
    }

    /// Visible rows holding `value` in `column` (0 if absent).
    pub fn count(&self, column: &str, value: &str) -> usize {
        self.columns
            .get(column)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Every (column, value) pair, column-major.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().flat_map(|(column, values)| {
            values
                .keys()
                .map(move |value| (column.as_str(), value.as_str()))
        })
    }

    /// Display entries for one column, most frequent first (ties by value).
    pub fn entries(&self, column: &str) -> Vec<ValueEntry> {
        let mut entries: Vec<ValueEntry> = self
            .columns
            .get(column)
            .into_iter()
            .flat_map(|values| values.iter())
            .map(|(value, &count)| ValueEntry { value: value.clone(), count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        entries
    }
}
