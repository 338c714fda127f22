// Property-based tests for index, suggestion and translation invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use facetbar_engine::{suggest, translate, FieldValue, Row, Suggestion, ValueIndex};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const COLUMNS: [&str; 4] = ["ticker", "name", "sector", "price"];

/// Arbitrary field: mostly short text, sometimes numeric, sometimes empty.
fn arb_field() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        4 => "[a-zA-Z]{1,6}".prop_map(FieldValue::Text),
        2 => (-1000i64..1000).prop_map(FieldValue::from),
        1 => (-100.0..100.0f64).prop_map(FieldValue::number),
        1 => Just(FieldValue::Empty),
        1 => any::<bool>().prop_map(FieldValue::Bool),
    ]
}

fn arb_row() -> impl Strategy<Value = Row> {
    proptest::collection::vec(arb_field(), COLUMNS.len())
        .prop_map(|values| COLUMNS.iter().copied().zip(values).collect())
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec(arb_row(), 0..12)
}

fn arb_chip() -> impl Strategy<Value = Suggestion> {
    prop_oneof![
        (0..COLUMNS.len(), "[a-zA-Z0-9]{1,4}")
            .prop_map(|(col, value)| Suggestion::column(COLUMNS[col], value)),
        "[a-zA-Z]{1,4}".prop_map(Suggestion::global),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// v is indexed under c iff some row stringifies field c to v.
    #[test]
    fn index_sound_and_complete(rows in arb_rows()) {
        let index = ValueIndex::build(&rows);

        let expected: HashSet<(String, String)> = rows
            .iter()
            .flat_map(|row| {
                row.fields()
                    .map(|(c, v)| (c.to_string(), v.display_string()))
                    .collect::<Vec<_>>()
            })
            .collect();
        let actual: HashSet<(String, String)> = index
            .iter()
            .map(|(c, v)| (c.to_string(), v.to_string()))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// Row order never changes the index.
    #[test]
    fn index_ignores_row_order(rows in arb_rows()) {
        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(ValueIndex::build(&rows), ValueIndex::build(&reversed));
    }

    /// Every suggestion contains the input and names an indexed column.
    #[test]
    fn suggestions_are_sound(rows in arb_rows(), input in "[a-zA-Z0-9]{0,3}") {
        let index = ValueIndex::build(&rows);
        let results = suggest(&input, &index);

        if input.is_empty() {
            prop_assert!(results.is_empty());
        }
        for s in &results {
            prop_assert!(!s.is_global());
            prop_assert!(index.has_column(s.column_name()));
            prop_assert!(index.contains(s.column_name(), s.value()));
            prop_assert!(s.value().to_lowercase().contains(&input.to_lowercase()));
        }
    }

    /// Every matching indexed value is suggested.
    #[test]
    fn suggestions_are_complete(rows in arb_rows(), input in "[a-zA-Z0-9]{1,2}") {
        let index = ValueIndex::build(&rows);
        let results: HashSet<Suggestion> = suggest(&input, &index).into_iter().collect();
        let needle = input.to_lowercase();

        for (column, value) in index.iter() {
            if value.to_lowercase().contains(&needle) {
                prop_assert!(results.contains(&Suggestion::column(column, value)));
            }
        }
    }

    /// Translation is a pure function of the chip sequence.
    #[test]
    fn translate_is_idempotent(chips in proptest::collection::vec(arb_chip(), 0..8)) {
        prop_assert_eq!(translate(&chips), translate(&chips));
    }

    /// A row passes iff it passes each column group and each global term.
    #[test]
    fn filter_spec_matches_chip_semantics(
        rows in arb_rows(),
        chips in proptest::collection::vec(arb_chip(), 0..5),
    ) {
        let spec = translate(&chips);
        for row in &rows {
            let columns_ok = COLUMNS.iter().all(|column| {
                let accepted: Vec<&str> = chips
                    .iter()
                    .filter(|c| !c.is_global() && c.column_name() == *column)
                    .map(|c| c.value())
                    .collect();
                accepted.is_empty()
                    || row.display(column).map_or(false, |v| accepted.contains(&v.as_str()))
            });
            let terms_ok = chips.iter().filter(|c| c.is_global()).all(|c| {
                let term = c.value().to_lowercase();
                row.fields()
                    .any(|(_, v)| v.display_string().to_lowercase().contains(&term))
            });
            prop_assert_eq!(spec.passes(row), columns_ok && terms_ok);
        }
    }
}
