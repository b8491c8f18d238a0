use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Durable slot for named state records
///
/// The storage medium is hidden behind this trait so the filter store never
/// needs to know whether it is writing to disk or to memory.
pub trait StateStorage: Send + Sync {
    /// Read the record stored under `name`, if any
    fn load(&self, name: &str) -> Result<Option<Value>>;

    /// Overwrite the record stored under `name`
    fn save(&self, name: &str, value: &Value) -> Result<()>;
}

/// Stores each record as `<dir>/<name>.json`
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create the storage directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, name: &str) -> Result<Option<Value>> {
        let path = self.record_path(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, name: &str, value: &Value) -> Result<()> {
        let path = self.record_path(name);

        // Write beside the target and rename over it so readers never see a torn record
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, value).context("Failed to encode state record")?;
        tmp.flush().context("Failed to flush state record")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to sync state record")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Saved state record to {}", path.display());
        Ok(())
    }
}

/// In-process storage, lost when the process exits
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.records.lock().get(name).cloned())
    }

    fn save(&self, name: &str, value: &Value) -> Result<()> {
        self.records.lock().insert(name.to_string(), value.clone());
        Ok(())
    }
}
