//! Facet session - the event loop glue
//!
//! A session owns the chip store, the value index and the table adapter and
//! reacts to one event at a time. Ordering guarantees:
//! - A chip change is translated and pushed to the table before the handler
//!   returns, so chips and applied filters never diverge.
//! - A visible-rows notification rebuilds the index before the next
//!   suggestion is computed. Suggestions are always pulled from the current
//!   index, never cached.

use serde::{Deserialize, Serialize};

use crate::adapter::TableAdapter;
use crate::chips::ChipStore;
use crate::events::{
    ChipChange, ChipsChangedEvent, EventCallback, FiltersAppliedEvent, IndexRebuiltEvent,
    InputEvent, Key, SessionEvent,
};
use crate::index::ValueIndex;
use crate::suggest::{group_by_column, is_free_text, suggest, Suggestion, SuggestionGroup};
use crate::translate::{translate, FilterSpec};
use crate::value::Row;

/// Interaction toggles. Defaults give the standard chip-input behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Enter with unmatched text commits it as a global chip
    pub commit_on_enter: bool,
    /// Losing focus with unmatched text commits it as a global chip
    pub commit_on_blur: bool,
    /// Backspace on empty input removes the last chip
    pub backspace_removes_last: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            commit_on_enter: true,
            commit_on_blur: true,
            backspace_removes_last: true,
        }
    }
}

pub struct FacetSession<T: TableAdapter> {
    table: T,
    store: ChipStore,
    index: ValueIndex,
    options: SessionOptions,
    /// Number of filter applications so far
    generation: u64,
    listener: Option<EventCallback>,
}

impl<T: TableAdapter> FacetSession<T> {
    /// Create a session and push the initial (empty) filters to the table.
    ///
    /// Tables that report visible rows synchronously have the index built
    /// before this returns.
    pub fn new(table: T, options: SessionOptions) -> Self {
        let mut session = Self {
            table,
            store: ChipStore::new(),
            index: ValueIndex::default(),
            options,
            generation: 0,
            listener: None,
        };
        session.apply_filters();
        session
    }

    pub fn set_listener(&mut self, listener: EventCallback) {
        self.listener = Some(listener);
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn chips(&self) -> &[Suggestion] {
        self.store.chips()
    }

    pub fn input_text(&self) -> &str {
        self.store.input_text()
    }

    pub fn index(&self) -> &ValueIndex {
        &self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Filter specification for the current chips.
    pub fn filter_spec(&self) -> FilterSpec {
        translate(self.store.chips())
    }

    /// Suggestions for the current input text.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        suggest(self.store.input_text(), &self.index)
    }

    /// Suggestions for the current input text, grouped by column.
    pub fn grouped_suggestions(&self) -> Vec<SuggestionGroup> {
        group_by_column(&self.suggestions())
    }

    // -------------------------------------------------------------------------
    // Inbound events
    // -------------------------------------------------------------------------

    /// Dispatch one widget event.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::TextChanged { text } => self.text_changed(text),
            InputEvent::OptionChosen { suggestion } => self.option_chosen(suggestion),
            InputEvent::Blur => self.blur(),
            InputEvent::KeyPressed { key, current_text, has_suggestions } => {
                self.key_pressed(key, current_text, has_suggestions)
            }
        }
    }

    pub fn text_changed(&mut self, text: impl Into<String>) {
        self.store.set_input_text(text);
    }

    pub fn option_chosen(&mut self, suggestion: Suggestion) {
        if self.store.select(suggestion) {
            self.chips_changed(ChipChange::Selected);
        }
    }

    /// Commit unmatched input as free text when focus leaves the input.
    pub fn blur(&mut self) {
        if !self.options.commit_on_blur {
            return;
        }
        let text = self.store.input_text().to_string();
        if is_free_text(&text, &self.index) && self.store.commit_free_text(&text) {
            self.chips_changed(ChipChange::FreeText);
        }
    }

    /// React to a key press with the widget's text. The widget's view of the
    /// suggestion list is trusted when given; otherwise the current index decides.
    pub fn key_pressed(&mut self, key: Key, current_text: String, has_suggestions: Option<bool>) {
        self.store.set_input_text(current_text);
        match key {
            Key::Enter if self.options.commit_on_enter => {
                let text = self.store.input_text().to_string();
                let has_suggestions =
                    has_suggestions.unwrap_or_else(|| !self.suggestions().is_empty());
                if !text.is_empty() && !has_suggestions && self.store.commit_free_text(&text) {
                    self.chips_changed(ChipChange::FreeText);
                }
            }
            Key::Backspace if self.options.backspace_removes_last => {
                if self.store.remove_last() {
                    self.chips_changed(ChipChange::RemovedLast);
                }
            }
            _ => {}
        }
    }

    /// Replace the chip sequence (direct edits of the chip list).
    pub fn replace_chips(&mut self, chips: Vec<Suggestion>) {
        if self.store.replace_all(chips) {
            self.chips_changed(ChipChange::Replaced);
        }
    }

    /// Remove one chip through its own control. Out of range is a no-op.
    pub fn remove_chip(&mut self, index: usize) {
        if index >= self.store.len() {
            return;
        }
        let remaining = self.store.without(index);
        self.replace_chips(remaining);
    }

    /// Remove every chip.
    pub fn clear_chips(&mut self) {
        if !self.store.is_empty() {
            self.replace_chips(Vec::new());
        }
    }

    /// Table callback: the visible row set changed.
    pub fn notify_visible_rows_changed(&mut self, rows: &[Row]) {
        self.index = ValueIndex::build(rows);
        log::debug!(
            "index rebuilt: {} row(s), {} column(s)",
            self.index.row_count(),
            self.index.column_count()
        );
        self.emit(SessionEvent::IndexRebuilt(IndexRebuiltEvent {
            rows: self.index.row_count(),
            columns: self.index.column_count(),
        }));
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn chips_changed(&mut self, change: ChipChange) {
        self.emit(SessionEvent::ChipsChanged(ChipsChangedEvent {
            change,
            chips: self.store.len(),
        }));
        self.apply_filters();
    }

    /// Translate the chips and push them to the table.
    fn apply_filters(&mut self) {
        let spec = translate(self.store.chips());
        let predicate = spec.predicate();
        let columns = spec.column_filters.len();
        let terms = spec.global_terms.len();

        self.generation += 1;
        log::debug!(
            "apply filters #{}: {} column(s), {} term(s)",
            self.generation,
            columns,
            terms
        );
        let visible = self.table.apply_filters(spec.column_filters, predicate);
        self.emit(SessionEvent::FiltersApplied(FiltersAppliedEvent {
            generation: self.generation,
            columns,
            terms,
        }));

        if let Some(rows) = visible {
            self.notify_visible_rows_changed(&rows);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}
