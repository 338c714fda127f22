//! Chip Store - committed selections plus the live input text
//!
//! Chips are kept in insertion order, which is also display order and the
//! order backspace removes them in. Duplicates are allowed.
//!
//! Every operation is total. Operations whose preconditions do not hold are
//! no-ops and report `false`, so a misbehaving caller can never leave the
//! store half-updated.

use crate::suggest::Suggestion;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipStore {
    chips: Vec<Suggestion>,
    /// Text currently typed in the input (not yet committed)
    input: String,
}

impl ChipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chips(&self) -> &[Suggestion] {
        &self.chips
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn input_text(&self) -> &str {
        &self.input
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Append an accepted suggestion and clear the input.
    pub fn select(&mut self, chosen: Suggestion) -> bool {
        log::debug!("chip select: {}", chosen);
        self.chips.push(chosen);
        self.input.clear();
        true
    }

    /// Append `text` as a global chip and clear the input.
    ///
    /// The caller is responsible for checking that `text` has no suggestions.
    /// Empty text is refused so the store never holds an empty global term.
    pub fn commit_free_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        log::debug!("chip commit free text: {:?}", text);
        self.chips.push(Suggestion::global(text));
        self.input.clear();
        true
    }

    /// Remove the last chip, only when the input is empty.
    pub fn remove_last(&mut self) -> bool {
        if !self.input.is_empty() {
            return false;
        }
        match self.chips.pop() {
            Some(removed) => {
                log::debug!("chip remove last: {}", removed);
                true
            }
            None => false,
        }
    }

    /// Replace the whole chip sequence (direct edits of the chip list).
    pub fn replace_all(&mut self, chips: Vec<Suggestion>) -> bool {
        log::debug!("chip replace all: {} -> {} chip(s)", self.chips.len(), chips.len());
        self.chips = chips;
        true
    }

    /// The chip sequence without the chip at `index`, for [`replace_all`].
    ///
    /// Out-of-range indices return the sequence unchanged.
    ///
    /// [`replace_all`]: ChipStore::replace_all
    pub fn without(&self, index: usize) -> Vec<Suggestion> {
        self.chips
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, chip)| chip.clone())
            .collect()
    }
}
