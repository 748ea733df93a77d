//! Preference store backends.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

use super::PreferenceStore;
use crate::error::PreferenceError;

fn lock_values(values: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    match values.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Preference lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(lock_values(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        lock_values(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        lock_values(&self.values).remove(key);
        Ok(())
    }
}

/// JSON object of string values on disk, rewritten on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// `<config dir>/trendsage/preferences.json`
    pub fn default_path() -> Result<PathBuf, PreferenceError> {
        dirs::config_dir()
            .map(|dir| dir.join("trendsage").join("preferences.json"))
            .ok_or(PreferenceError::NoDirectory)
    }

    pub fn open_default() -> Result<Self, PreferenceError> {
        Self::open(Self::default_path()?)
    }

    /// Loads `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| PreferenceError::Corrupt {
                    path: path.clone(),
                    source: e,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(PreferenceError::Read { path, source: e }),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling file, then renames over the target.
    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        let write_err = |source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(values).map_err(|e| PreferenceError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(lock_values(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = lock_values(&self.values);
        if values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let mut values = lock_values(&self.values);
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&values)
    }
}
