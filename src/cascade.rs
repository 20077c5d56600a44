//! Cascading suppression of repeated leading fields.
//!
//! Columns form a hierarchy in [`Column::ALL`] order. A row's value in column
//! `i` is blanked when columns `0..=i` all match the previous row. Once a row
//! differs at some column, that column and every column after it are printed
//! again, even if their own values repeat.

use crate::schema::{Column, Record};

/// Index of the first column where `a` and `b` differ, or `None` when every
/// column matches.
fn first_difference(a: &Record, b: &Record) -> Option<usize> {
    Column::ALL.iter().position(|&c| a.get(c) != b.get(c))
}

/// Blanks repeated values in place. Rows are compared using their values as
/// they were before blanking.
pub fn apply_cascade(rows: &mut [Record]) {
    let mut previous: Option<Record> = None;

    for row in rows.iter_mut() {
        let original = row.clone();

        if let Some(prev) = &previous {
            let keep_from = first_difference(prev, &original).unwrap_or(Column::ALL.len());
            for &column in &Column::ALL[..keep_from] {
                row.get_mut(column).clear();
            }
        }

        previous = Some(original);
    }
}

pub fn cascaded(mut rows: Vec<Record>) -> Vec<Record> {
    apply_cascade(&mut rows);
    rows
}
