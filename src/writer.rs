use crate::error::SheetwrapResult;
use std::fs;
use std::path::Path;

/// UTF-8 byte-order mark; spreadsheet tools need it to detect the encoding
pub const UTF8_BOM: &str = "\u{feff}";

/// File name offered for the converted text
pub const DEFAULT_OUTPUT_NAME: &str = "output.txt";

/// Bytes of the downloadable artifact: BOM followed by the text
pub fn to_download_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM.as_bytes());
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Write converted text to `path` as BOM-prefixed UTF-8
pub fn write_output(path: &Path, text: &str) -> SheetwrapResult<()> {
    fs::write(path, to_download_bytes(text))?;
    Ok(())
}
