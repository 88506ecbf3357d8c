use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Grid
//==============================================================================

/// Rows of cell text read from a spreadsheet or delimited file.
///
/// Row 0 is the header row and defines the column count used for masking.
/// A grid is never mutated in place; transformations build a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string slices (handy for literals)
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Header row, or an empty slice for an empty grid
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns defined by the header row
    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply a function to every cell below the header, producing a new grid
    pub fn map_data_cells<F>(&self, mut f: F) -> Grid
    where
        F: FnMut(&str) -> String,
    {
        Grid {
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    if i == 0 {
                        row.clone()
                    } else {
                        row.iter().map(|cell| f(cell)).collect()
                    }
                })
                .collect(),
        }
    }
}

//==============================================================================
// Column Mask
//==============================================================================

/// Keep/drop decision per header column (`true` = keep)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMask(Vec<bool>);

impl ColumnMask {
    /// Mask keeping every one of `columns` columns
    pub fn all(columns: usize) -> Self {
        Self(vec![true; columns])
    }

    /// Mask keeping only the given zero-based column indices
    pub fn from_indices(columns: usize, keep: &[usize]) -> Self {
        let mut mask = vec![false; columns];
        for &index in keep {
            if let Some(slot) = mask.get_mut(index) {
                *slot = true;
            }
        }
        Self(mask)
    }

    /// Missing entries count as "drop"
    pub fn is_selected(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.0.iter().filter(|keep| **keep).count()
    }

    pub fn all_selected(&self) -> bool {
        self.0.iter().all(|keep| *keep)
    }

    pub fn none_selected(&self) -> bool {
        !self.0.iter().any(|keep| *keep)
    }

    /// Flip one column; out-of-range indices are ignored
    pub fn toggle(&mut self, index: usize) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = !*slot;
        }
    }

    /// Select everything, or deselect everything if all are already selected
    pub fn toggle_all(&mut self) {
        let target = !self.all_selected();
        self.0.iter_mut().for_each(|keep| *keep = target);
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for ColumnMask {
    fn from(mask: Vec<bool>) -> Self {
        Self(mask)
    }
}

//==============================================================================
// Header Signature
//==============================================================================

/// Exact-match fingerprint of a header (sub)sequence, used as a memory key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Wrap an already-derived signature string (e.g. read back from storage)
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
