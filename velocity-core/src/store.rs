//! Key -> JSON blob persistence.
//!
//! The key set is fixed: tasks, evidence log, the two simulation toggles and
//! the minted pool snapshot.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VelocityError};

pub const KEY_TASKS: &str = "vx_tasks";
pub const KEY_EVIDENCE: &str = "vx_evidence";
pub const KEY_SIM_RPA: &str = "vx_simRPA";
pub const KEY_SIM_SERVICE: &str = "vx_simSVC";
pub const KEY_POOL: &str = "vx_pool";

pub const ALL_KEYS: [&str; 5] = [KEY_TASKS, KEY_EVIDENCE, KEY_SIM_RPA, KEY_SIM_SERVICE, KEY_POOL];

pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&mut self, key: &str, json: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub fn get_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn put_json<T: Serialize>(store: &mut dyn StateStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.put(key, &json)
}

/// Drop every known key, e.g. before writing a fresh seed.
pub fn clear(store: &mut dyn StateStore) -> Result<()> {
    for key in ALL_KEYS {
        store.remove(key)?;
    }
    Ok(())
}

/// In-process store; used by tests and embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, json: &str) -> Result<()> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| VelocityError::Store(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(VelocityError::Store(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let p = self.path_for(key)?;
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p)
            .map_err(|e| VelocityError::Store(format!("read {}: {e}", p.display())))?;
        Ok(Some(s))
    }

    fn put(&mut self, key: &str, json: &str) -> Result<()> {
        let p = self.path_for(key)?;
        // atomic replace
        let tmp = p.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| VelocityError::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &p)
            .map_err(|e| VelocityError::Store(format!("rename {}: {e}", p.display())))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let p = self.path_for(key)?;
        if p.exists() {
            fs::remove_file(&p)
                .map_err(|e| VelocityError::Store(format!("remove {}: {e}", p.display())))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_json() {
        let mut s = MemoryStore::new();
        put_json(&mut s, KEY_SIM_RPA, &true).unwrap();
        let v: Option<bool> = get_json(&s, KEY_SIM_RPA).unwrap();
        assert_eq!(v, Some(true));
        let missing: Option<bool> = get_json(&s, KEY_SIM_SERVICE).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn file_store_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut s = FileStore::open(dir.path()).unwrap();
            s.put(KEY_SIM_SERVICE, "false").unwrap();
        }
        let s = FileStore::open(dir.path()).unwrap();
        assert_eq!(s.get(KEY_SIM_SERVICE).unwrap().as_deref(), Some("false"));
        assert!(dir.path().join("vx_simSVC.json").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        assert!(s.put("../escape", "{}").is_err());
    }

    #[test]
    fn clear_drops_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        for key in ALL_KEYS {
            s.put(key, "null").unwrap();
        }
        clear(&mut s).unwrap();
        for key in ALL_KEYS {
            assert_eq!(s.get(key).unwrap(), None, "{key} survived");
        }
        // clearing an empty store is fine
        clear(&mut s).unwrap();
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        s.put(KEY_TASKS, "[]").unwrap();
        s.remove(KEY_TASKS).unwrap();
        s.remove(KEY_TASKS).unwrap();
        assert_eq!(s.get(KEY_TASKS).unwrap(), None);
    }
}
