use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::errors::StorageError;

/// Durable string key-value medium the preferences store writes through to.
///
/// Values are JSON text. `Ok(None)` means the key was never written.
pub trait Storage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage.
///
/// Clones share the same entries, so two stores built over clones of one
/// `MemoryStorage` behave like two sessions over the same medium.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    available: Rc<Cell<bool>>,
    saves: Rc<Cell<usize>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            entries: Rc::default(),
            available: Rc::new(Cell::new(true)),
            saves: Rc::default(),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle whether reads and writes fail with
    /// [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Write a raw entry, bypassing the store.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.get_raw(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        self.insert_raw(key, value);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Storage backed by a single JSON object file, one member per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(
        &self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            },
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<serde_json::Value>(&data)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Json(err)) => {
                log::warn!(
                    "preferences file {} is corrupt, rewriting: {err}",
                    self.path.display()
                );
                serde_json::Map::new()
            },
            Err(err) => return Err(err),
        };
        entries.insert(
            key.to_string(),
            serde_json::Value::String(value.to_string()),
        );

        let payload =
            serde_json::to_string_pretty(&serde_json::Value::Object(entries))?;
        write_atomic(&self.path, payload.as_bytes())?;

        Ok(())
    }
}

fn write_atomic(path: &Path, payload: &[u8]) -> Result<(), std::io::Error> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}
