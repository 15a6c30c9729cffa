//! Assertion functions for checking run outputs.

use std::fmt::Debug;
use std::path::Path;

/// Assert that two row lists are equal in order and content.
///
/// # Panics
///
/// Panics if the lists differ in length or at any position.
///
/// # Example
///
/// ```
/// use ironshard::testing::assert_rows_equal;
///
/// let rows = vec![vec!["1".to_string()], vec!["2".to_string()]];
/// assert_rows_equal(&rows, &rows.clone());
/// ```
pub fn assert_rows_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(a, e, "Row mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}");
    }
}

/// Assert that `column` holds the integers `0, 1, 2, …` in row order.
///
/// Pair with [`write_numbered_csv`](super::write_numbered_csv) to check that
/// a run restored the original row order.
///
/// # Panics
///
/// Panics if the column is missing, a value is not an integer, or the
/// sequence skips, repeats, or goes backwards.
pub fn assert_monotonic_column(header: &[String], rows: &[Vec<String>], column: &str) {
    let idx = header
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("Column {column:?} not in header {header:?}"));
    for (expected, row) in rows.iter().enumerate() {
        let value: usize = row[idx]
            .parse()
            .unwrap_or_else(|_| panic!("Row {expected}: {:?} is not a position", row[idx]));
        assert_eq!(value, expected, "Row order broken at output row {expected}");
    }
}

/// Assert that a directory has no entries.
///
/// Used to check that transient chunk files were cleaned up.
///
/// # Panics
///
/// Panics if the directory cannot be read or contains anything.
pub fn assert_dir_empty(dir: impl AsRef<Path>) {
    let dir = dir.as_ref();
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("read_dir {}: {e}", dir.display()))
        .filter_map(|entry| entry.ok().map(|e| e.file_name()))
        .collect();
    assert!(
        leftovers.is_empty(),
        "Expected {} to be empty, found: {leftovers:?}",
        dir.display()
    );
}
