//! Storage for the path to resume after login

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::debug;

use crate::error::Result;

/// Key under which the resume path is stored
pub const REDIRECT_SLOT_KEY: &str = "redirectAfterLogin";

/// A small string key/value store that outlives a single screen
pub trait RedirectSlot: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read and clear the value
    fn take(&self, key: &str) -> Result<Option<String>>;
}

/// Slot kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RedirectSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.remove(key))
    }
}

/// Slot backed by one file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Use `dir`, creating it if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl RedirectSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Storing {} in {}", key, self.dir.display());
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>> {
        let value = self.get(key)?;
        if value.is_some() {
            fs::remove_file(self.path(key))?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(slot: &dyn RedirectSlot) {
        assert_eq!(slot.get(REDIRECT_SLOT_KEY).unwrap(), None);
        slot.set(REDIRECT_SLOT_KEY, "/tip-details/42").unwrap();
        assert_eq!(
            slot.get(REDIRECT_SLOT_KEY).unwrap().as_deref(),
            Some("/tip-details/42")
        );
        assert_eq!(
            slot.take(REDIRECT_SLOT_KEY).unwrap().as_deref(),
            Some("/tip-details/42")
        );
        assert_eq!(slot.take(REDIRECT_SLOT_KEY).unwrap(), None);
    }

    #[test]
    fn memory_slot() {
        exercise(&MemorySlot::new());
    }

    #[test]
    fn file_slot() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSlot::new(dir.path().join("state")).unwrap());
    }

    #[test]
    fn file_slot_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        FileSlot::new(dir.path())
            .unwrap()
            .set(REDIRECT_SLOT_KEY, "/my-tips")
            .unwrap();

        let reopened = FileSlot::new(dir.path()).unwrap();
        assert_eq!(
            reopened.take(REDIRECT_SLOT_KEY).unwrap().as_deref(),
            Some("/my-tips")
        );
    }
}
