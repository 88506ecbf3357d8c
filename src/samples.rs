//! Sample files showing what a source table and its converted text look like

use crate::error::SheetwrapResult;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXAMPLE_TEMPLATE_NAME: &str = "example-output.txt";
pub const EXAMPLE_SOURCE_NAME: &str = "example-output.csv";

/// A converted product description, every line within 40 characters
pub const EXAMPLE_TEMPLATE: &str = "Gerätebeschreibung:
- Hybridsystem Compress Hybrid 5800i G
- All-In-One-Heizung, vorbereitet für
  den Anschluss einer Luft-Wasser-Wärme-
  pumpe Außeneinheit
- OptiEnergy-Hybridsysteme ohne Puffer-
  speicher möglich

Ausstattung:
- Heizkreispumpe und Pumpe für
  Wärmepumpenkreis integriert
- Neue XCU Steuereinheit mit integrier-
  ten Hybridfunktionen

Hinweis:
- Einfach online: K 40 RF im Lieferum-
  fang enthalten.";

/// The table the template above was produced from
pub const EXAMPLE_SOURCE_CSV: &str = r#""GERAETEBESCHREIBUNG_BULLETS","AUSSTATTUNG","HINWEIS"
"- Hybridsystem Compress Hybrid 5800i G","- Heizkreispumpe und Pumpe für Wärmepumpenkreis integriert","- Einfach online: K 40 RF im Lieferumfang enthalten."
"- All-In-One-Heizung, vorbereitet für den Anschluss einer Luft-Wasser-Wärmepumpe Außeneinheit","- Neue XCU Steuereinheit mit integrierten Hybridfunktionen",""
"- OptiEnergy-Hybridsysteme ohne Pufferspeicher möglich","",""
"#;

/// Write both sample files into `dir` (created if missing)
pub fn write_samples(dir: &Path) -> SheetwrapResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let template_path = dir.join(EXAMPLE_TEMPLATE_NAME);
    let source_path = dir.join(EXAMPLE_SOURCE_NAME);
    fs::write(&template_path, EXAMPLE_TEMPLATE)?;
    fs::write(&source_path, EXAMPLE_SOURCE_CSV)?;

    Ok(vec![template_path, source_path])
}
