//! Spreadsheet importer - first sheet of a workbook or delimited file → Grid

use crate::error::{SheetwrapError, SheetwrapResult};
use crate::types::Grid;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How a source file is decoded, picked from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// xlsx, xlsm, xls, xlsb, ods (anything calamine can open)
    Workbook,
    /// Delimited text with the given separator
    Delimited(u8),
}

impl SourceKind {
    pub fn from_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => SourceKind::Delimited(b','),
            Some("tsv") | Some("tab") | Some("txt") => SourceKind::Delimited(b'\t'),
            _ => SourceKind::Workbook,
        }
    }
}

/// Reads the first sheet of a source file into a Grid
pub struct GridImporter {
    path: PathBuf,
}

impl GridImporter {
    /// Create a new importer for a file on disk
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the file to a Grid
    pub fn import(&self) -> SheetwrapResult<Grid> {
        debug!(path = %self.path.display(), "Importing source file");
        match SourceKind::from_name(&self.path.to_string_lossy()) {
            SourceKind::Delimited(separator) => {
                let bytes = std::fs::read(&self.path).map_err(|e| {
                    SheetwrapError::Ingestion(format!("Failed to read file: {}", e))
                })?;
                read_delimited(&bytes, separator)
            }
            SourceKind::Workbook => {
                let workbook = open_workbook_auto(&self.path).map_err(|e| {
                    SheetwrapError::Ingestion(format!("Failed to open workbook: {}", e))
                })?;
                read_first_sheet(workbook)
            }
        }
    }
}

/// Import a file on disk
pub fn read_grid<P: AsRef<Path>>(path: P) -> SheetwrapResult<Grid> {
    GridImporter::new(path).import()
}

/// Import uploaded bytes; `name` only selects the decoder
pub fn read_grid_from_bytes(bytes: &[u8], name: &str) -> SheetwrapResult<Grid> {
    match SourceKind::from_name(name) {
        SourceKind::Delimited(separator) => read_delimited(bytes, separator),
        SourceKind::Workbook => {
            let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
                SheetwrapError::Ingestion(format!("Failed to open workbook: {}", e))
            })?;
            read_first_sheet(workbook)
        }
    }
}

fn read_first_sheet<RS: Read + Seek>(mut workbook: Sheets<RS>) -> SheetwrapResult<Grid> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetwrapError::Ingestion("No sheets found in the workbook.".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        SheetwrapError::Ingestion(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    debug!(sheet = %sheet_name, size = ?range.get_size(), "Read first sheet");
    finish_grid(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect()
}

/// Render one cell the way it reads in the sheet
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Whole numbers print without a fractional part
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn read_delimited(bytes: &[u8], separator: u8) -> SheetwrapResult<Grid> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(separator)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| SheetwrapError::Ingestion(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    finish_grid(rows)
}

/// Drop zero-length rows and reject an empty sheet.
///
/// Rows whose cells are all blank are data too and stay in place.
fn finish_grid(rows: Vec<Vec<String>>) -> SheetwrapResult<Grid> {
    let rows: Vec<Vec<String>> = rows.into_iter().filter(|row| !row.is_empty()).collect();

    if rows.is_empty() {
        return Err(SheetwrapError::Ingestion(
            "Sheet appears to be empty.".to_string(),
        ));
    }

    Ok(Grid::new(rows))
}
