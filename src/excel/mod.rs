//! Spreadsheet import
//!
//! Decodes the first sheet of an uploaded source file into a Grid:
//! - Workbooks (.xlsx, .xlsm, .xls, .xlsb, .ods) via calamine
//! - Delimited text (.csv, .tsv) via csv

mod importer;

pub use importer::{cell_to_text, read_grid, read_grid_from_bytes, GridImporter, SourceKind};
