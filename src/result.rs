//! Execution records and the result store collaborator
//!
//! Each context owns exactly one [`ExecutionRecord`], created and reported
//! to the store as started when the context is constructed, and reported
//! again as finished when the run completes.

use crate::value::Variable;
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use uuid::Uuid;

/// Result store backend trait
pub trait ResultStore {
    /// Record that a run has started
    fn start(&mut self, record: &ExecutionRecord) -> Result<()>;

    /// Record that a run has finished
    fn finish(&mut self, record: &ExecutionRecord) -> Result<()>;
}

/// An argument the run was started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionArgument {
    pub name: String,
    pub value: Variable,
}

/// One interpretation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    #[serde(default)]
    pub program: Option<String>,
    pub start_time: DateTime<Utc>,
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arguments: Vec<ExecutionArgument>,
}

impl ExecutionRecord {
    /// A fresh, in-progress record
    pub fn new(program: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            program,
            start_time: Utc::now(),
            finish_time: None,
            arguments: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }
}

/// In-memory store; clones share the same records
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<Vec<ExecutionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored records in start order
    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records.borrow().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<ExecutionRecord> {
        self.records.borrow().iter().find(|r| r.id == id).cloned()
    }
}

impl ResultStore for MemoryStore {
    fn start(&mut self, record: &ExecutionRecord) -> Result<()> {
        let mut records = self.records.borrow_mut();
        if records.iter().any(|r| r.id == record.id) {
            anyhow::bail!("Execution {} already started", record.id);
        }
        records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, record: &ExecutionRecord) -> Result<()> {
        let mut records = self.records.borrow_mut();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| anyhow::anyhow!("Execution {} was never started", record.id))?;
        *slot = record.clone();
        Ok(())
    }
}

/// Directory of JSON files, one per execution
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create record directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn write(&self, record: &ExecutionRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        let path = self.record_path(record.id);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write record: {}", path.display()))?;
        Ok(())
    }

    /// Load a single record
    pub fn load(&self, id: Uuid) -> Result<ExecutionRecord> {
        let path = self.record_path(id);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read record: {}", path.display()))?;
        let record = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// All records in the directory, newest start first
    pub fn list(&self) -> Result<Vec<ExecutionRecord>> {
        let mut records = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read record directory: {}", self.dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read record directory: {}", self.dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read record: {}", path.display()))?;
            let record: ExecutionRecord = serde_json::from_str(&content)
                .with_context(|| format!("Invalid record: {}", path.display()))?;
            records.push(record);
        }
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(records)
    }
}

impl ResultStore for JsonFileStore {
    fn start(&mut self, record: &ExecutionRecord) -> Result<()> {
        if self.record_path(record.id).exists() {
            anyhow::bail!("Execution {} already started", record.id);
        }
        self.write(record)
    }

    fn finish(&mut self, record: &ExecutionRecord) -> Result<()> {
        self.write(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_lifecycle() {
        let handle = MemoryStore::new();
        let mut store = handle.clone();
        let mut record = ExecutionRecord::new(Some("discounts".to_string()));

        store.start(&record).unwrap();
        assert!(!handle.get(record.id).unwrap().is_finished());
        assert!(store.start(&record).is_err());

        record.finish_time = Some(Utc::now());
        store.finish(&record).unwrap();
        assert!(handle.get(record.id).unwrap().is_finished());
        assert_eq!(handle.records().len(), 1);
    }

    #[test]
    fn test_memory_store_finish_unknown() {
        let mut store = MemoryStore::new();
        assert!(store.finish(&ExecutionRecord::new(None)).is_err());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("records")).unwrap();

        let mut record = ExecutionRecord::new(None);
        record.arguments.push(ExecutionArgument {
            name: "customer".to_string(),
            value: Variable::record([("id", Variable::Int(17))]),
        });
        store.start(&record).unwrap();
        assert!(!store.load(record.id).unwrap().is_finished());

        record.finish_time = Some(Utc::now());
        store.finish(&record).unwrap();

        let loaded = store.load(record.id).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_store_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        let mut store = JsonFileStore::new(dir.path()).unwrap();
        store.start(&ExecutionRecord::new(None)).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_store_list_names_missing_directory() {
        let dir = TempDir::new().unwrap();
        let records = dir.path().join("records");
        let store = JsonFileStore::new(&records).unwrap();
        std::fs::remove_dir_all(&records).unwrap();

        let err = store.list().unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to read record directory"));
        assert!(message.contains(&records.display().to_string()));
    }

    #[test]
    fn test_json_file_store_list_names_bad_record() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{not json").unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let message = format!("{:#}", store.list().unwrap_err());
        assert!(message.contains(&bad.display().to_string()));
    }
}
