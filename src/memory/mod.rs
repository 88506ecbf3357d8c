//! Template memory: remembered column selections and example templates
//!
//! Records are keyed by header signature. The column mask is stored under
//! the raw signature (all header cells) and the template under the selected
//! signature (only the kept cells), so different raw layouts that select
//! down to the same columns share one template.
//!
//! The whole mapping is one JSON blob, loaded fresh on every read and
//! rewritten wholesale on every write. Memory is a convenience: a missing
//! or corrupt blob reads as empty, and failed writes are logged and dropped.

mod store;

pub use store::{InMemoryStore, JsonFileStore, TemplateStore, STORAGE_KEY};

use crate::error::SheetwrapError;
use crate::types::{ColumnMask, Signature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What is remembered for one signature. Both fields are optional and
/// merged independently on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_columns: Option<ColumnMask>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// A parsed copy of the persisted mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySnapshot {
    records: BTreeMap<Signature, TemplateRecord>,
}

impl MemorySnapshot {
    pub fn get(&self, signature: &Signature) -> Option<&TemplateRecord> {
        self.records.get(signature)
    }

    /// Remembered mask for a raw signature
    pub fn columns_for(&self, signature: &Signature) -> Option<&ColumnMask> {
        self.get(signature)
            .and_then(|record| record.selected_columns.as_ref())
    }

    /// Remembered template for a selected signature
    pub fn template_for(&self, signature: &Signature) -> Option<&str> {
        self.get(signature)
            .and_then(|record| record.template.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Signature, &TemplateRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Signature-keyed memory over a swappable store
pub struct TemplateMemory<S> {
    store: S,
}

impl<S: TemplateStore> TemplateMemory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read and parse the persisted mapping; never fails
    pub fn load(&self) -> MemorySnapshot {
        let blob = match self.store.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => return MemorySnapshot::default(),
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Template memory unreadable, starting empty");
                return MemorySnapshot::default();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Template memory corrupt, starting empty");
                MemorySnapshot::default()
            }
        }
    }

    pub fn get(&self, signature: &Signature) -> Option<TemplateRecord> {
        self.load().get(signature).cloned()
    }

    /// All records, ordered by signature
    pub fn entries(&self) -> Vec<(Signature, TemplateRecord)> {
        self.load()
            .records
            .into_iter()
            .collect()
    }

    /// Merge-write the column mask for a raw signature
    pub fn remember_columns(&self, signature: &Signature, mask: &ColumnMask) {
        self.update(signature, |record| {
            record.selected_columns = Some(mask.clone());
        });
    }

    /// Merge-write the template for a selected signature
    pub fn remember_template(&self, signature: &Signature, template: &str) {
        self.update(signature, |record| {
            record.template = Some(template.to_string());
        });
    }

    fn update<F>(&self, signature: &Signature, apply: F)
    where
        F: FnOnce(&mut TemplateRecord),
    {
        let mut snapshot = self.load();
        apply(snapshot.records.entry(signature.clone()).or_default());

        let written = serde_json::to_string(&snapshot)
            .map_err(SheetwrapError::from)
            .and_then(|blob| self.store.write_blob(&blob));

        match written {
            Ok(()) => debug!(signature = %signature, "Template memory updated"),
            Err(e) => warn!(signature = %signature, error = %e, "Failed to save to template memory"),
        }
    }
}
