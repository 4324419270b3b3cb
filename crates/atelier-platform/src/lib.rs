//! Durable key-value storage behind the admin client's session state.
//!
//! The session concept ("token and user markers survive process restarts")
//! matters more than the storage mechanism, so the backing is swappable:
//! in-memory for tests and ephemeral sessions, a JSON file for production.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyValueError {
    #[error("key not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub trait KeyValueStore: Send + Sync {
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError>;

    fn get(&self, key: &str) -> Result<String, KeyValueError>;

    fn remove(&self, key: &str) -> Result<(), KeyValueError>;
}

#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String, KeyValueError> {
        let data = self
            .data
            .read()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        data.get(key).cloned().ok_or(KeyValueError::NotFound)
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        if data.remove(key).is_none() {
            return Err(KeyValueError::NotFound);
        }
        Ok(())
    }
}

/// File-backed store holding one flat JSON object per file.
///
/// Writes go through a temp file and rename so a crash mid-write never
/// leaves a truncated store behind.
#[derive(Clone)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within one process.
    lock: Arc<RwLock<()>>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(RwLock::new(())),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, KeyValueError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => {
                return Err(KeyValueError::Unavailable(format!(
                    "failed reading {}: {err}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str::<HashMap<String, String>>(&raw).map_err(|err| {
            KeyValueError::Backend(format!("failed parsing {}: {err}", self.path.display()))
        })
    }

    fn save(&self, data: &HashMap<String, String>) -> Result<(), KeyValueError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                KeyValueError::Backend(format!(
                    "failed creating store directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let encoded = serde_json::to_vec(data)
            .map_err(|err| KeyValueError::Backend(err.to_string()))?;
        let temp_path = temp_path_for(&self.path);
        fs::write(&temp_path, encoded).map_err(|err| {
            KeyValueError::Backend(format!(
                "failed writing temp store {}: {err}",
                temp_path.display()
            ))
        })?;

        if let Err(rename_err) = fs::rename(&temp_path, &self.path) {
            // Windows does not allow replacing existing files via rename.
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    let _ = fs::remove_file(&temp_path);
                    return Err(KeyValueError::Backend(format!(
                        "failed replacing store {} after rename error ({rename_err}): {err}",
                        self.path.display()
                    )));
                }
            }
            fs::rename(&temp_path, &self.path).map_err(|err| {
                let _ = fs::remove_file(&temp_path);
                KeyValueError::Backend(format!(
                    "failed writing store {} after temp write: {err}",
                    self.path.display()
                ))
            })?;
        }

        Ok(())
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        let mut data = self.load()?;
        data.insert(key.to_owned(), value.to_owned());
        self.save(&data)
    }

    fn get(&self, key: &str) -> Result<String, KeyValueError> {
        let _guard = self
            .lock
            .read()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        self.load()?.remove(key).ok_or(KeyValueError::NotFound)
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| KeyValueError::Backend("poisoned lock".to_owned()))?;
        let mut data = self.load()?;
        if data.remove(key).is_none() {
            return Err(KeyValueError::NotFound);
        }
        self.save(&data)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("session-store.json");
    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    parent.join(format!(".{file_name}.{now_nanos}.tmp"))
}

/// Key-prefix scoping wrapper, so two clients can share one backing store
/// without colliding.
#[derive(Clone)]
pub struct ScopedKeyValueStore<S: KeyValueStore> {
    inner: S,
    prefix: String,
}

impl<S: KeyValueStore> ScopedKeyValueStore<S> {
    pub fn new(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}.{key}", self.prefix)
    }
}

impl<S: KeyValueStore> KeyValueStore for ScopedKeyValueStore<S> {
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        self.inner.set(&self.scoped(key), value)
    }

    fn get(&self, key: &str) -> Result<String, KeyValueError> {
        self.inner.get(&self.scoped(key))
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueError> {
        self.inner.remove(&self.scoped(key))
    }
}
