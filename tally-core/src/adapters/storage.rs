//! Session storage adapters
//!
//! - `FileSessionStorage`: a JSON object in `session.json`, the durable
//!   store used by the CLI. Writes go through a temp file and a rename so
//!   the user and token keys land on disk together.
//! - `MemorySessionStorage`: process-local, for tests and embedders that
//!   do not want persistence.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStorage;

type Entries = BTreeMap<String, String>;

/// Session storage backed by a JSON file
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileSessionStorage {
    /// Storage at `<dir>/session.json`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("session.json"),
            lock_path: dir.join(".session.lock"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the cross-process lock guarding the session file.
    /// Released when the returned file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;
        Ok(file)
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let mut content = String::new();
        File::open(&self.path)?.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        // A corrupt file reads as empty; the session store then treats
        // the session as absent and clears it.
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::storage("Session file has no parent directory"))?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| Error::storage(format!("Failed to write session file: {}", e.error)))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let _lock = self.lock(true)?;
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        if !self.path.exists() {
            return Ok(vec![None; keys.len()]);
        }
        let _lock = self.lock(false)?;
        let mut entries = self.read_entries()?;
        Ok(keys.iter().map(|key| entries.remove(*key)).collect())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.update(|current| {
            for (key, value) in entries {
                current.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|current| {
            for key in keys {
                current.remove(*key);
            }
        })
    }
}

/// In-memory session storage
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<Entries>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut Entries) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(f(&mut entries))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        self.with_entries(|entries| keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_entries(|current| {
            for (key, value) in entries {
                current.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.with_entries(|current| {
            for key in keys {
                current.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ACCESS_TOKEN_KEY, USER_KEY};
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_set_get_remove() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        assert_eq!(storage.get(USER_KEY).unwrap(), None);

        storage
            .set_many(&[(USER_KEY, "{\"id\":\"u1\"}"), (ACCESS_TOKEN_KEY, "tok")])
            .unwrap();
        assert!(storage.path().exists());
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok"));

        storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY]).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        FileSessionStorage::new(dir.path())
            .set_many(&[(ACCESS_TOKEN_KEY, "tok")])
            .unwrap();

        let reopened = FileSessionStorage::new(dir.path());
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        std::fs::write(storage.path(), "{not json").unwrap();

        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        storage.set_many(&[(USER_KEY, "x")]).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_storage_remove_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        storage
            .set_many(&[(USER_KEY, "u"), (ACCESS_TOKEN_KEY, "t"), ("theme", "dark")])
            .unwrap();

        storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY]).unwrap();
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_get_many_follows_key_order() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        assert_eq!(storage.get_many(&[USER_KEY, ACCESS_TOKEN_KEY]).unwrap(), vec![None, None]);

        storage.set_many(&[(USER_KEY, "u"), (ACCESS_TOKEN_KEY, "t")]).unwrap();
        assert_eq!(
            storage.get_many(&[ACCESS_TOKEN_KEY, "theme", USER_KEY]).unwrap(),
            vec![Some("t".to_string()), None, Some("u".to_string())]
        );
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        storage.set_many(&[(USER_KEY, "u"), (ACCESS_TOKEN_KEY, "t")]).unwrap();
        assert_eq!(storage.len(), 2);
        storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY]).unwrap();
        assert!(storage.is_empty());
    }
}
