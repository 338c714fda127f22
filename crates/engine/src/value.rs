//! Field values and rows as the engine sees them.
//!
//! Rows are owned by the table; the engine only reads them and reduces every
//! field to a display string. That reduction is total: any value, including
//! NaN, infinities and error tags, has a string form.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// =============================================================================
// FieldValue
// =============================================================================

/// A primitive display value held by one field of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldValue {
    /// Empty field
    #[default]
    Empty,
    Text(String),
    /// Numeric (ordered so rows can be hashed and compared)
    Number(OrderedFloat<f64>),
    Bool(bool),
    /// Error marker from the source table (#REF!, #N/A, ...)
    Error(String),
}

impl FieldValue {
    pub fn number(n: f64) -> Self {
        FieldValue::Number(OrderedFloat(n))
    }

    /// Parse a raw cell with light type inference.
    ///
    /// Blank → Empty, `true`/`false` (any case) → Bool, anything `f64` accepts
    /// and is finite → Number, otherwise Text with the original spelling.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return FieldValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return FieldValue::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::number(n),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Canonical string form used for indexing, matching and exact filters.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(n.0),
            FieldValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            FieldValue::Error(tag) => tag.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// JSON values map onto the primitive variants; arrays and objects keep
/// their compact JSON text so stringification never fails.
impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Empty,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => json_number(n),
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// Largest integer magnitude an f64 holds exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Integers beyond f64 precision keep their decimal text so the index and
/// exact-match filters see the value that is in the data.
fn json_number(n: &serde_json::Number) -> FieldValue {
    let exact = match (n.as_i64(), n.as_u64()) {
        (Some(i), _) => Some(i.unsigned_abs() <= MAX_EXACT_INTEGER),
        (None, Some(u)) => Some(u <= MAX_EXACT_INTEGER),
        (None, None) => None,
    };
    match exact {
        Some(false) => FieldValue::Text(n.to_string()),
        _ => match n.as_f64() {
            Some(f) => FieldValue::number(f),
            None => FieldValue::Text(n.to_string()),
        },
    }
}

// =============================================================================
// Row
// =============================================================================

/// An ordered record of named fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style field append.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a field. A repeated column name replaces the earlier value in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Stringified field, None if the row has no such column.
    pub fn display(&self, column: &str) -> Option<String> {
        self.get(column).map(FieldValue::display_string)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a row from a JSON object. Non-object values yield None.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(
            object
                .iter()
                .map(|(key, value)| (key.clone(), FieldValue::from(value)))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}
