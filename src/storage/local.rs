use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const STORAGE_FILE: &str = "storage.json";

/// Persistent string key/value storage backed by a single JSON object file.
///
/// Every mutation rewrites the whole file through a temp file and a rename, so
/// a crash mid-write leaves the previous contents intact. Clones share the same
/// in-memory map.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open (or lazily create) `storage.json` inside `dir`. A file that is
    /// not a JSON object of strings is moved aside and the storage opens empty.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(STORAGE_FILE);
        let items = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.display().to_string(),
                source,
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str(&contents) {
                    Ok(items) => items,
                    Err(err) => quarantine(&path, &err)?,
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { path, items })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().items.get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.items.insert(key.to_string(), value.into());
        inner.persist()
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.items.remove(key).is_some() {
            inner.persist()?;
        }
        Ok(())
    }

    /// Read a JSON-encoded value. Missing keys and undecodable values both read
    /// as `None`; the latter is logged.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, "Ignoring undecodable stored value: {error}");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|err| StorageError::Encode {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        self.set_item(key, encoded)
    }
}

/// Move an unreadable storage file to `storage.json.corrupt` and start empty.
fn quarantine(
    path: &Path,
    err: &serde_json::Error,
) -> Result<BTreeMap<String, String>, StorageError> {
    let moved_to = path.with_extension("json.corrupt");
    fs::rename(path, &moved_to).map_err(|rename_err| StorageError::Corrupt {
        path: path.display().to_string(),
        message: format!("{err}; could not move it aside: {rename_err}"),
    })?;
    tracing::warn!(
        path = %path.display(),
        moved_to = %moved_to.display(),
        "Storage file was corrupt and has been moved aside: {err}"
    );
    Ok(BTreeMap::new())
}

impl Inner {
    fn persist(&self) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(write_err)?;

        let json = serde_json::to_string_pretty(&self.items).map_err(|err| {
            StorageError::Encode {
                key: STORAGE_FILE.to_string(),
                message: err.to_string(),
            }
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}
