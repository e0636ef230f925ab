//! Author: [Seclususs](https://github.com/seclususs)

//! Bootup entries: values written by a preference that are re-applied after
//! the device restarts. Entries are keyed by `(category, name)`.

use crate::common::traits::BootupStore;
use crate::daemon::types;

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::Write;
use std::{fs, io, path};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootupEntry {
    pub category: String,
    pub name: String,
    pub filename: String,
    pub value: String,
    pub enabled: bool,
}

impl BootupEntry {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        filename: impl Into<String>,
        value: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            filename: filename.into(),
            value: value.into(),
            enabled,
        }
    }
    fn same_slot(&self, other: &BootupEntry) -> bool {
        self.category == other.category && self.name == other.name
    }
}

fn upsert(entries: &mut Vec<BootupEntry>, entry: BootupEntry) {
    match entries.iter_mut().find(|e| e.same_slot(&entry)) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

#[derive(Debug, Default)]
pub struct MemoryBootupStore {
    entries: RefCell<Vec<BootupEntry>>,
}

impl MemoryBootupStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn entries(&self) -> Vec<BootupEntry> {
        self.entries.borrow().clone()
    }
    pub fn entries_in(&self, category: &str) -> Vec<BootupEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }
}

impl BootupStore for MemoryBootupStore {
    fn set_bootup(&self, entry: BootupEntry) -> Result<(), types::DevctlError> {
        upsert(&mut self.entries.borrow_mut(), entry);
        Ok(())
    }
}

/// Entries persisted as a JSON array. Every update rewrites the whole file
/// through a sibling temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonBootupStore {
    path: path::PathBuf,
}

impl JsonBootupStore {
    pub fn new(path: impl Into<path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }

    pub fn entries(&self) -> Result<Vec<BootupEntry>, types::DevctlError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(types::DevctlError::IoError(e)),
        }
    }

    pub fn entries_in(&self, category: &str) -> Result<Vec<BootupEntry>, types::DevctlError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.category == category)
            .collect())
    }

    fn persist(&self, entries: &[BootupEntry]) -> Result<(), types::DevctlError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => path::Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serde_json::to_vec_pretty(entries)?)?;
        tmp.persist(&self.path).map_err(|e| types::DevctlError::IoError(e.error))?;
        Ok(())
    }
}

impl BootupStore for JsonBootupStore {
    fn set_bootup(&self, entry: BootupEntry) -> Result<(), types::DevctlError> {
        let mut entries = self.entries()?;
        log::debug!(
            "Bootup: storing {}/{} -> {}",
            entry.category,
            entry.name,
            entry.filename
        );
        upsert(&mut entries, entry);
        self.persist(&entries)
    }
}
