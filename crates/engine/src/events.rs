//! Event types at the session boundary.
//!
//! Inbound: [`InputEvent`] is what the input widget produces.
//! Outbound: [`SessionEvent`] notifies observers (status lines, logs, the
//! test harness) after the session has finished reacting to an event.

use serde::{Deserialize, Serialize};

use crate::suggest::Suggestion;

// =============================================================================
// Inbound
// =============================================================================

/// Keys the session reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Backspace,
    Escape,
    Tab,
    Other,
}

/// Raw events from the input widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// The input text changed (typing, paste, clear).
    TextChanged { text: String },
    /// The user picked an entry from the suggestion list.
    OptionChosen { suggestion: Suggestion },
    /// The input lost focus.
    Blur,
    /// A key was pressed, with the widget's view of the text and the list.
    /// Without `has_suggestions` the session checks its own index.
    KeyPressed {
        key: Key,
        #[serde(default)]
        current_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        has_suggestions: Option<bool>,
    },
}

// =============================================================================
// Outbound
// =============================================================================

/// Why the chip sequence changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipChange {
    Selected,
    FreeText,
    RemovedLast,
    Replaced,
}

/// Events emitted by a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The chip sequence changed.
    ChipsChanged(ChipsChangedEvent),
    /// Filters derived from the chips were pushed to the table.
    FiltersApplied(FiltersAppliedEvent),
    /// The value index was rebuilt from a new visible row set.
    IndexRebuilt(IndexRebuiltEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipsChangedEvent {
    pub change: ChipChange,
    /// Chip count after the change.
    pub chips: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersAppliedEvent {
    /// Monotonic counter, one per application.
    pub generation: u64,
    /// Number of filtered columns.
    pub columns: usize,
    /// Number of global terms.
    pub terms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRebuiltEvent {
    pub rows: usize,
    pub columns: usize,
}

/// Callback type for receiving session events.
pub type EventCallback = Box<dyn FnMut(SessionEvent)>;

/// Simple event collector.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SessionEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only ChipsChanged events.
    pub fn chips_changed(&self) -> Vec<&ChipsChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::ChipsChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only FiltersApplied events.
    pub fn filters_applied(&self) -> Vec<&FiltersAppliedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::FiltersApplied(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Filter to only IndexRebuilt events.
    pub fn index_rebuilt(&self) -> Vec<&IndexRebuiltEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::IndexRebuilt(i) => Some(i),
                _ => None,
            })
            .collect()
    }
}
