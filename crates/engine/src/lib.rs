//! `facetbar-engine`: faceted search over a table's visible rows.
//!
//! Pure engine crate: no IO, no threads. A [`FacetSession`] turns input
//! widget events into chips, chips into filters, and filters into table
//! updates; the table reports visible rows back and the value index follows.

pub mod adapter;
pub mod chips;
pub mod events;
pub mod index;
pub mod session;
pub mod suggest;
pub mod translate;
pub mod value;

#[cfg(test)]
pub mod harness;

pub use adapter::{MemoryTable, TableAdapter};
pub use chips::ChipStore;
pub use events::{InputEvent, Key, SessionEvent};
pub use index::ValueIndex;
pub use session::{FacetSession, SessionOptions};
pub use suggest::{suggest, Suggestion, SuggestionGroup, GLOBAL_COLUMN};
pub use translate::{translate, ColumnFilters, FilterSpec, GlobalPredicate};
pub use value::{FieldValue, Row};
