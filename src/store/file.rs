use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::Store;
use crate::error::Result;

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        trace!(path = %path.display(), "reading ledger document");
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        trace!(path = %path.display(), bytes = value.len(), "writing ledger document");
        fs::write(path, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("customers").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        store.set("customers", "[]").unwrap();

        assert!(store.path_for("customers").exists());
        assert_eq!(store.get("customers").unwrap().as_deref(), Some("[]"));
    }
}
