//! Grid projection and header signatures
//!
//! `project` renders the columns a mask keeps as tab-separated text, the
//! flat form handed to the formatter as source data. `derive_signature` is
//! the single place header fingerprints are computed; memory keys are only
//! ever built through it.

use crate::types::{ColumnMask, Grid, Signature};
use regex::{Regex, RegexBuilder};

/// Joins header cells into a signature. Not escaped inside cells.
pub const SIGNATURE_DELIMITER: char = '|';

/// Render the kept columns of every row (header included) as TSV.
///
/// Cells beyond the end of the mask are dropped. An empty grid yields an
/// empty string.
pub fn project(grid: &Grid, mask: &ColumnMask) -> String {
    grid.rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(index, _)| mask.is_selected(*index))
                .map(|(_, cell)| cell.as_str())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exact-match fingerprint of a sequence of header cells
pub fn derive_signature<S: AsRef<str>>(cells: &[S]) -> Signature {
    let mut raw = String::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            raw.push(SIGNATURE_DELIMITER);
        }
        raw.push_str(cell.as_ref());
    }
    Signature::new(raw)
}

/// Header cells kept by `mask`, in original order
pub fn select_headers<'a>(header: &'a [String], mask: &ColumnMask) -> Vec<&'a str> {
    header
        .iter()
        .enumerate()
        .filter(|(index, _)| mask.is_selected(*index))
        .map(|(_, cell)| cell.as_str())
        .collect()
}

/// Signature of the full header row (key for the column mask)
pub fn raw_signature(grid: &Grid) -> Signature {
    derive_signature(grid.header())
}

/// Signature of the kept header cells (key for the template)
pub fn selected_signature(grid: &Grid, mask: &ColumnMask) -> Signature {
    derive_signature(&select_headers(grid.header(), mask))
}

/// Remove every case-insensitive occurrence of `needle` from every data
/// cell. The header row is left alone so signatures do not depend on it.
///
/// An empty needle returns the grid unchanged.
pub fn strip_text(grid: &Grid, needle: &str) -> Grid {
    match removal_pattern(needle) {
        Some(pattern) => grid.map_data_cells(|cell| pattern.replace_all(cell, "").into_owned()),
        None => grid.clone(),
    }
}

/// `strip_text` for already flattened text, such as pasted source data
pub fn strip_text_str(text: &str, needle: &str) -> String {
    match removal_pattern(needle) {
        Some(pattern) => pattern.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

fn removal_pattern(needle: &str) -> Option<Regex> {
    if needle.is_empty() {
        return None;
    }
    // an escaped literal always compiles
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}
