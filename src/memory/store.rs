//! Storage media for the template memory blob.
//!
//! A store only knows how to read and write one opaque string under the
//! well-known key. Parsing and merging live in `TemplateMemory`.

use crate::error::SheetwrapResult;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key the blob is persisted under
pub const STORAGE_KEY: &str = "aiDataFormatterTemplateMemory";

/// Backing medium for the template memory blob
pub trait TemplateStore: Send + Sync {
    fn name(&self) -> &str;

    /// The persisted blob, or `None` if nothing was ever written
    fn read_blob(&self) -> SheetwrapResult<Option<String>>;

    /// Replace the persisted blob wholesale
    fn write_blob(&self, blob: &str) -> SheetwrapResult<()>;
}

impl<T: TemplateStore + ?Sized> TemplateStore for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_blob(&self) -> SheetwrapResult<Option<String>> {
        (**self).read_blob()
    }

    fn write_blob(&self, blob: &str) -> SheetwrapResult<()> {
        (**self).write_blob(blob)
    }
}

impl<T: TemplateStore + ?Sized> TemplateStore for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_blob(&self) -> SheetwrapResult<Option<String>> {
        (**self).read_blob()
    }

    fn write_blob(&self, blob: &str) -> SheetwrapResult<()> {
        (**self).write_blob(blob)
    }
}

/// A local key-value JSON file: `{ "<STORAGE_KEY>": "<blob>" }`.
///
/// Other keys in the file are preserved on write. The file and its parent
/// directories are created on first write.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path: `~/.sheetwrap/storage.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".sheetwrap").join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> SheetwrapResult<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let entries: Map<String, Value> = serde_json::from_str(&content)?;
        Ok(Some(entries))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl TemplateStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    fn read_blob(&self) -> SheetwrapResult<Option<String>> {
        let blob = self
            .read_entries()?
            .and_then(|mut entries| entries.remove(STORAGE_KEY))
            .and_then(|value| match value {
                Value::String(blob) => Some(blob),
                _ => None,
            });
        Ok(blob)
    }

    fn write_blob(&self, blob: &str) -> SheetwrapResult<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Replacing unreadable storage file");
                Map::new()
            }
        };
        entries.insert(STORAGE_KEY.to_string(), Value::String(blob.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        debug!(path = %self.path.display(), bytes = blob.len(), "Template memory written");
        Ok(())
    }
}

/// Process-local store; nothing survives the process
#[derive(Default)]
pub struct InMemoryStore {
    blob: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing blob (possibly malformed, for tests)
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }
}

impl TemplateStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn read_blob(&self) -> SheetwrapResult<Option<String>> {
        let guard = self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn write_blob(&self, blob: &str) -> SheetwrapResult<()> {
        let mut guard = self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(blob.to_string());
        Ok(())
    }
}
