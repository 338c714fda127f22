//! Scenario harness for sessions over an in-memory table.
//!
//! `SessionHarness` drives a `FacetSession<MemoryTable>` one input event at a
//! time and, after every step, checks the invariants the event loop promises:
//! - the table holds exactly the filters translated from the current chips
//! - the index equals a fresh build over the table's visible rows
//! - the index never contains a value from a hidden row

use std::cell::RefCell;
use std::rc::Rc;

use crate::adapter::MemoryTable;
use crate::events::{EventCollector, InputEvent, Key};
use crate::index::ValueIndex;
use crate::session::{FacetSession, SessionOptions};
use crate::suggest::Suggestion;
use crate::translate::translate;
use crate::value::Row;

/// Test harness wrapping a session with event tracking and invariant checks.
pub struct SessionHarness {
    session: FacetSession<MemoryTable>,
    events: Rc<RefCell<EventCollector>>,
    steps: usize,
}

impl SessionHarness {
    pub fn new(rows: Vec<Row>) -> Self {
        Self::with_options(rows, SessionOptions::default())
    }

    pub fn with_options(rows: Vec<Row>, options: SessionOptions) -> Self {
        let mut session = FacetSession::new(MemoryTable::new(rows), options);
        let events = Rc::new(RefCell::new(EventCollector::new()));
        let sink = events.clone();
        session.set_listener(Box::new(move |event| sink.borrow_mut().push(event)));
        let harness = Self { session, events, steps: 0 };
        harness.assert_in_sync();
        harness
    }

    pub fn session(&self) -> &FacetSession<MemoryTable> {
        &self.session
    }

    pub fn events(&self) -> std::cell::Ref<'_, EventCollector> {
        self.events.borrow()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Apply one event, then check invariants.
    pub fn step(&mut self, event: InputEvent) -> &mut Self {
        self.session.handle(event);
        self.steps += 1;
        self.assert_in_sync();
        self
    }

    pub fn type_text(&mut self, text: &str) -> &mut Self {
        self.step(InputEvent::TextChanged { text: text.to_string() })
    }

    /// Choose the first suggestion for the current text. Panics if none.
    pub fn choose_first(&mut self) -> &mut Self {
        let first = self
            .session
            .suggestions()
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no suggestion for {:?}", self.session.input_text()));
        self.step(InputEvent::OptionChosen { suggestion: first })
    }

    pub fn blur(&mut self) -> &mut Self {
        self.step(InputEvent::Blur)
    }

    /// Press a key the way a widget would report it: with the live text and
    /// whether the suggestion list is showing anything.
    pub fn press(&mut self, key: Key) -> &mut Self {
        let current_text = self.session.input_text().to_string();
        let has_suggestions = Some(!self.session.suggestions().is_empty());
        self.step(InputEvent::KeyPressed { key, current_text, has_suggestions })
    }

    pub fn chips(&self) -> &[Suggestion] {
        self.session.chips()
    }

    pub fn visible_count(&self) -> usize {
        self.session.table().visible_count()
    }

    /// Panics if chips, applied filters and index have diverged.
    pub fn assert_in_sync(&self) {
        let table = self.session.table();
        let spec = translate(self.session.chips());

        assert_eq!(
            table.column_filters(),
            &spec.column_filters,
            "step {}: table column filters out of sync with chips",
            self.steps
        );
        assert_eq!(
            table.predicate().terms(),
            spec.global_terms.as_slice(),
            "step {}: table predicate out of sync with chips",
            self.steps
        );

        let visible = table.visible_rows();
        assert_eq!(
            self.session.index(),
            &ValueIndex::build(&visible),
            "step {}: index not rebuilt from visible rows",
            self.steps
        );

        for (data_row, row) in table.rows().iter().enumerate() {
            assert_eq!(
                table.is_data_row_visible(data_row),
                spec.passes(row),
                "step {}: row {} visibility disagrees with filters",
                self.steps,
                data_row
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocks() -> Vec<Row> {
        vec![
            Row::new().with("ticker", "AAPL").with("name", "Apple").with("sector", "Tech").with("price", 190.5),
            Row::new().with("ticker", "MSFT").with("name", "Microsoft").with("sector", "Tech").with("price", 410.0),
            Row::new().with("ticker", "F").with("name", "Ford").with("sector", "Auto").with("price", 12.0),
            Row::new().with("ticker", "GM").with("name", "General Motors").with("sector", "Auto").with("price", 45.0),
            Row::new().with("ticker", "JPM").with("name", "JPMorgan").with("sector", "Finance").with("price", 198.0),
        ]
    }

    #[test]
    fn test_select_then_narrow() {
        let mut h = SessionHarness::new(stocks());
        h.type_text("auto").choose_first();
        assert_eq!(h.chips(), &[Suggestion::column("sector", "Auto")]);
        assert_eq!(h.visible_count(), 2);

        // Only visible rows feed suggestions: "Tech" is gone
        h.type_text("tech");
        assert!(h.session().suggestions().is_empty());

        h.type_text("mot").choose_first();
        assert_eq!(h.visible_count(), 1);
        assert_eq!(h.steps(), 5);
    }

    #[test]
    fn test_enter_and_backspace_cycle() {
        let mut h = SessionHarness::new(stocks());
        h.type_text("morgan");
        // "morgan" matches JPMorgan, so Enter does not commit
        h.press(Key::Enter);
        assert!(h.chips().is_empty());

        h.type_text("qqq").press(Key::Enter);
        assert_eq!(h.chips(), &[Suggestion::global("qqq")]);
        assert_eq!(h.visible_count(), 0);

        h.press(Key::Backspace);
        assert!(h.chips().is_empty());
        assert_eq!(h.visible_count(), 5);

        // Nothing left to remove
        h.press(Key::Backspace);
        assert!(h.chips().is_empty());
    }

    #[test]
    fn test_global_term_then_blur() {
        let mut h = SessionHarness::new(stocks());
        h.type_text("xyz").blur();
        assert_eq!(h.chips(), &[Suggestion::global("xyz")]);

        h.press(Key::Backspace);
        h.type_text("o").blur();
        // "o" matches plenty, blur keeps it as input
        assert!(h.chips().is_empty());
        assert_eq!(h.session().input_text(), "o");
    }

    #[test]
    fn test_event_counts() {
        let mut h = SessionHarness::new(stocks());
        h.type_text("tech").choose_first();
        h.press(Key::Backspace);

        let events = h.events();
        assert_eq!(events.chips_changed().len(), 2);
        assert_eq!(events.filters_applied().len(), 2);
        assert_eq!(events.index_rebuilt().len(), 2);
        assert_eq!(events.index_rebuilt()[1].rows, 5);
    }
}
