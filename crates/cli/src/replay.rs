//! Event script replay: drive a session headlessly from recorded widget events.
//!
//! A script is a JSON object:
//!
//! ```json
//! {
//!   "options": {"commit_on_blur": false},
//!   "steps": [
//!     {"event": "text_changed", "text": "auto"},
//!     {"event": "option_chosen", "suggestion": {"column": "sector", "value": "Auto"}},
//!     {"event": "key_pressed", "key": "backspace"}
//!   ],
//!   "expect": {"visible": 5, "chips": []}
//! }
//! ```
//!
//! `options` and `expect` are optional. Missing options come from settings.
//! With `--verify`, a final state that disagrees with `expect` fails the run.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use facetbar_engine::events::EventCollector;
use facetbar_engine::{FacetSession, InputEvent, MemoryTable, Row, SessionOptions, Suggestion};
use serde::{Deserialize, Serialize};

use crate::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    #[serde(default)]
    pub options: Option<SessionOptions>,
    pub steps: Vec<InputEvent>,
    #[serde(default)]
    pub expect: Option<Expectation>,
}

/// Expected state after the last step. Absent fields are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    pub visible: Option<usize>,
    pub chips: Option<Vec<Suggestion>>,
    pub input: Option<String>,
}

/// Session state after one step.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub step: usize,
    pub event: InputEvent,
    pub chips: Vec<Suggestion>,
    pub input: String,
    pub visible: usize,
    pub generation: u64,
}

/// Result of replaying a script.
#[derive(Debug, Serialize)]
pub struct ReplayResult {
    pub rows: usize,
    pub steps: Vec<ReplayStep>,
    /// Session events emitted during the run, by kind.
    pub events: EventCounts,
    /// Mismatches against `expect`; empty when nothing was expected.
    pub mismatches: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct EventCounts {
    pub total: usize,
    pub chips_changed: usize,
    pub filters_applied: usize,
    pub index_rebuilt: usize,
}

impl EventCounts {
    fn from_collector(collector: &EventCollector) -> Self {
        Self {
            total: collector.len(),
            chips_changed: collector.chips_changed().len(),
            filters_applied: collector.filters_applied().len(),
            index_rebuilt: collector.index_rebuilt().len(),
        }
    }
}

impl ReplayResult {
    pub fn verified(&self) -> bool {
        self.mismatches.is_empty()
    }
}

pub fn load_script(path: &Path) -> Result<ReplayScript, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_script(&text).map_err(|e| CliError::script(format!("{}: {}", path.display(), e)))
}

pub fn parse_script(text: &str) -> Result<ReplayScript, serde_json::Error> {
    serde_json::from_str(text)
}

/// Run every step against a fresh session over `rows`.
pub fn run_script(rows: Vec<Row>, script: &ReplayScript, defaults: SessionOptions) -> ReplayResult {
    let row_count = rows.len();
    let options = script.options.unwrap_or(defaults);
    let mut session = FacetSession::new(MemoryTable::new(rows), options);

    let collector = Rc::new(RefCell::new(EventCollector::new()));
    let sink = collector.clone();
    session.set_listener(Box::new(move |event| {
        log::debug!("session event: {:?}", event);
        sink.borrow_mut().push(event);
    }));

    let mut steps = Vec::with_capacity(script.steps.len());
    for (i, event) in script.steps.iter().enumerate() {
        session.handle(event.clone());
        steps.push(ReplayStep {
            step: i + 1,
            event: event.clone(),
            chips: session.chips().to_vec(),
            input: session.input_text().to_string(),
            visible: session.table().visible_count(),
            generation: session.generation(),
        });
    }

    let mismatches = match &script.expect {
        Some(expect) => check_expectation(expect, &session),
        None => Vec::new(),
    };

    let events = EventCounts::from_collector(&collector.borrow());
    ReplayResult { rows: row_count, steps, events, mismatches }
}

fn check_expectation(expect: &Expectation, session: &FacetSession<MemoryTable>) -> Vec<String> {
    let mut mismatches = Vec::new();

    if let Some(visible) = expect.visible {
        let actual = session.table().visible_count();
        if actual != visible {
            mismatches.push(format!("visible: expected {}, got {}", visible, actual));
        }
    }
    if let Some(chips) = &expect.chips {
        if session.chips() != chips.as_slice() {
            mismatches.push(format!(
                "chips: expected [{}], got [{}]",
                join_chips(chips),
                join_chips(session.chips())
            ));
        }
    }
    if let Some(input) = &expect.input {
        if session.input_text() != input {
            mismatches.push(format!(
                "input: expected {:?}, got {:?}",
                input,
                session.input_text()
            ));
        }
    }

    mismatches
}

pub fn join_chips(chips: &[Suggestion]) -> String {
    chips.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
}
