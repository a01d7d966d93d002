use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use velocity_core::FileStore;

/// Resolve the data directory: `--home`, then `$VELOCITY_HOME`, then `~/.velocity`.
pub fn velocity_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var("VELOCITY_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".velocity"))
}

pub fn ensure_velocity_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = velocity_home(override_dir)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Persisted session state lives under `<home>/state`.
pub fn open_store(home: &Path) -> Result<FileStore> {
    let dir = home.join("state");
    FileStore::open(&dir).with_context(|| format!("open state store at {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_home_wins() {
        let dir = tempfile::tempdir().unwrap();
        let home = velocity_home(Some(dir.path())).unwrap();
        assert_eq!(home, dir.path());
    }

    #[test]
    fn store_is_created_under_home() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).unwrap();
        assert_eq!(store.dir(), dir.path().join("state"));
        assert!(store.dir().is_dir());
    }
}
