//! Table boundary
//!
//! The engine never reaches into a table. It pushes column filters and a
//! global predicate through [`TableAdapter`], asks for a refilter, and the
//! table reports the resulting visible rows back through
//! `FacetSession::notify_visible_rows_changed`.
//!
//! [`MemoryTable`] is a headless table used by the CLI and tests:
//! - rows are stored in data order and never mutated
//! - visible_mask is indexed by data row
//! - visibility is recomputed only on refilter()

use crate::translate::{passes_columns, ColumnFilters, GlobalPredicate};
use crate::value::Row;

/// Outbound interface to the table.
pub trait TableAdapter {
    /// Exact-match column filters (OR within column, AND across columns).
    fn set_column_filters(&mut self, filters: ColumnFilters);

    /// Global row predicate; an always-true predicate lifts the restriction.
    fn set_global_predicate(&mut self, predicate: GlobalPredicate);

    /// Re-evaluate visibility with the current filters.
    ///
    /// Tables that can report synchronously return the new visible rows;
    /// others return None and call back into the session later.
    fn refilter(&mut self) -> Option<Vec<Row>>;

    /// Set both filters, then refilter.
    fn apply_filters(
        &mut self,
        filters: ColumnFilters,
        predicate: GlobalPredicate,
    ) -> Option<Vec<Row>> {
        self.set_column_filters(filters);
        self.set_global_predicate(predicate);
        self.refilter()
    }
}

// =============================================================================
// MemoryTable
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    /// Rows in data order
    rows: Vec<Row>,
    column_filters: ColumnFilters,
    predicate: GlobalPredicate,
    /// Visibility indexed by data row; true = visible
    visible_mask: Vec<bool>,
}

impl MemoryTable {
    /// All rows start visible.
    pub fn new(rows: Vec<Row>) -> Self {
        let visible_mask = vec![true; rows.len()];
        Self {
            rows,
            column_filters: ColumnFilters::default(),
            predicate: GlobalPredicate::always(),
            visible_mask,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn visible_count(&self) -> usize {
        self.visible_mask.iter().filter(|&&visible| visible).count()
    }

    pub fn is_filtered(&self) -> bool {
        self.visible_count() < self.row_count()
    }

    pub fn is_data_row_visible(&self, data_row: usize) -> bool {
        self.visible_mask.get(data_row).copied().unwrap_or(false)
    }

    /// Visible rows in data order.
    pub fn visible_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .zip(&self.visible_mask)
            .filter(|(_, &visible)| visible)
            .map(|(row, _)| row.clone())
            .collect()
    }

    pub fn column_filters(&self) -> &ColumnFilters {
        &self.column_filters
    }

    pub fn predicate(&self) -> &GlobalPredicate {
        &self.predicate
    }
}

impl TableAdapter for MemoryTable {
    fn set_column_filters(&mut self, filters: ColumnFilters) {
        self.column_filters = filters;
    }

    fn set_global_predicate(&mut self, predicate: GlobalPredicate) {
        self.predicate = predicate;
    }

    fn refilter(&mut self) -> Option<Vec<Row>> {
        self.visible_mask = self
            .rows
            .iter()
            .map(|row| passes_columns(&self.column_filters, row) && self.predicate.passes(row))
            .collect();
        log::debug!(
            "refilter: {}/{} row(s) visible",
            self.visible_count(),
            self.row_count()
        );
        Some(self.visible_rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::Suggestion;
    use crate::translate::translate;

    fn table() -> MemoryTable {
        MemoryTable::new(vec![
            Row::new().with("ticker", "AAPL").with("sector", "Tech"),
            Row::new().with("ticker", "F").with("name", "Ford").with("sector", "Auto"),
            Row::new().with("ticker", "MSFT").with("sector", "Tech"),
        ])
    }

    #[test]
    fn test_starts_fully_visible() {
        let table = table();
        assert_eq!(table.visible_count(), 3);
        assert!(!table.is_filtered());
    }

    #[test]
    fn test_apply_filters_refilters() {
        let mut table = table();
        let spec = translate(&[Suggestion::column("sector", "Tech")]);
        let visible = table
            .apply_filters(spec.column_filters.clone(), spec.predicate())
            .unwrap();

        assert_eq!(visible.len(), 2);
        assert!(table.is_data_row_visible(0));
        assert!(!table.is_data_row_visible(1));
        assert!(table.is_data_row_visible(2));
        assert!(!table.is_data_row_visible(7));
        assert!(table.is_filtered());
    }

    #[test]
    fn test_filters_do_nothing_until_refilter() {
        let mut table = table();
        let spec = translate(&[Suggestion::global("ford")]);
        table.set_column_filters(spec.column_filters.clone());
        table.set_global_predicate(spec.predicate());
        assert_eq!(table.visible_count(), 3);

        let visible = table.refilter().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].display("ticker").as_deref(), Some("F"));
    }

    #[test]
    fn test_empty_spec_restores_all_rows() {
        let mut table = table();
        let spec = translate(&[Suggestion::column("sector", "Auto")]);
        let predicate = spec.predicate();
        table.apply_filters(spec.column_filters, predicate);
        assert_eq!(table.visible_count(), 1);

        table.apply_filters(ColumnFilters::default(), GlobalPredicate::always());
        assert_eq!(table.visible_count(), 3);
    }
}
