//! Property-based tests for slice resolution and table indexing.
//!
//! These check invariants that must hold for any slice and any table shape,
//! not just the hand-picked cases in `index_tests.rs` and `table_tests.rs`.

use phreeqc_core::{MemoryEngine, Phreeqc, Selection, Slice, TableIndex, Var};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_bound() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![Just(None), (-20i64..20).prop_map(Some)]
}

fn arb_step() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        Just(None),
        (1i64..5).prop_map(Some),
        (-5i64..0).prop_map(Some)
    ]
}

fn arb_slice() -> impl Strategy<Value = Slice> {
    (arb_bound(), arb_bound(), arb_step()).prop_map(|(start, stop, step)| Slice::new(start, stop, step))
}

/// Slicing `list(range(len))` in Python, written from the language
/// reference: negative bounds count from the end, then bounds clamp to the
/// positions a walk in the step's direction can reach.
fn python_slice(len: i64, start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Vec<i64> {
    let step = step.unwrap_or(1);
    let from_end = |b: i64| if b < 0 { b + len } else { b };
    if step > 0 {
        let first = start.map_or(0, from_end).clamp(0, len);
        let end = stop.map_or(len, from_end).clamp(0, len);
        (first..end.max(first)).step_by(step as usize).collect()
    } else {
        let first = start.map_or(len - 1, from_end).clamp(-1, len - 1);
        let end = stop.map_or(-1, from_end).clamp(-1, len - 1);
        (end + 1..=first).rev().step_by((-step) as usize).collect()
    }
}

/// A table whose cell (r, c) holds `r * 100 + c`.
fn numbered_table(rows: usize, columns: usize) -> Phreeqc<MemoryEngine> {
    let cells = (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| Var::Long((r * 100 + c) as i64))
                .collect()
        })
        .collect();
    Phreeqc::new(MemoryEngine::from_rows(cells))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn positions_stay_in_bounds(slice in arb_slice(), len in 0usize..15) {
        for p in slice.positions(len).unwrap() {
            prop_assert!(p >= 0 && (p as usize) < len, "{} out of 0..{}", p, len);
        }
    }

    #[test]
    fn positions_advance_by_step(slice in arb_slice(), len in 0usize..15) {
        let step = slice.step.unwrap_or(1);
        let positions = slice.positions(len).unwrap();
        for pair in positions.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], step);
        }
    }

    #[test]
    fn positions_match_python_slicing(slice in arb_slice(), len in 0usize..15) {
        let expected = python_slice(len as i64, slice.start, slice.stop, slice.step);
        prop_assert_eq!(slice.positions(len).unwrap(), expected);
    }

    #[test]
    fn unit_step_matches_range(start in 0i64..15, stop in 0i64..15, len in 0usize..15) {
        let positions = Slice::range(start, stop).positions(len).unwrap();
        let expected: Vec<i64> = (start.min(len as i64)..stop.min(len as i64)).collect();
        prop_assert_eq!(positions, expected);
    }

    #[test]
    fn reversed_full_slice_is_reverse(len in 0usize..15) {
        let forward = Slice::full().positions(len).unwrap();
        let mut backward = Slice::new(None, None, Some(-1)).positions(len).unwrap();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn single_cell_reads_its_value(rows in 1usize..6, columns in 1usize..6, r in 0usize..6, c in 0usize..6) {
        prop_assume!(r < rows && c < columns);
        let table = numbered_table(rows, columns);
        let cell = table.get((r, c)).unwrap();
        prop_assert_eq!(cell, Selection::Scalar(Var::Long((r * 100 + c) as i64)));
    }

    #[test]
    fn slice_slice_shape_follows_positions(
        rows in 0usize..6,
        columns in 0usize..6,
        row_slice in arb_slice(),
        column_slice in arb_slice(),
    ) {
        let table = numbered_table(rows, columns);
        // A table without rows reports no columns either.
        let columns = if rows == 0 { 0 } else { columns };
        let row_positions = row_slice.positions(rows).unwrap();
        let column_positions = column_slice.positions(columns).unwrap();
        let selection = table.get(TableIndex::new(row_slice, column_slice)).unwrap();

        let cell = |r: i64, c: i64| Var::Long(r * 100 + c);
        match (row_positions.len(), column_positions.len()) {
            (1, 1) => prop_assert_eq!(
                selection,
                Selection::Scalar(cell(row_positions[0], column_positions[0]))
            ),
            (1, _) => prop_assert_eq!(
                selection,
                Selection::List(column_positions.iter().map(|&c| cell(row_positions[0], c)).collect())
            ),
            (_, 1) => prop_assert_eq!(
                selection,
                Selection::List(row_positions.iter().map(|&r| cell(r, column_positions[0])).collect())
            ),
            _ => prop_assert_eq!(
                selection,
                Selection::Table(
                    row_positions
                        .iter()
                        .map(|&r| column_positions.iter().map(|&c| cell(r, c)).collect())
                        .collect()
                )
            ),
        }
    }
}
