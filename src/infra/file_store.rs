use crate::app::ports::KeyValueStore;
use crate::common::error::{Result, SwipeError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One `<key>.json` file per slot under a data directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SwipeError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.slot_path(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));

        // Temp file then rename over the slot
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &target)
        };
        write().map_err(|e| SwipeError::persistence(key, e))?;

        debug!("Wrote slot {} to {}", key, target.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("stats").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.set("stats", r#"{"likes":1,"passes":2}"#).unwrap();
            store.set("stats", r#"{"likes":2,"passes":2}"#).unwrap();
        }
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get("stats").unwrap().as_deref(),
            Some(r#"{"likes":2,"passes":2}"#)
        );
        assert!(store.slot_path("stats").exists());
        assert!(!dir.path().join(".stats.json.tmp").exists());
    }

    #[test]
    fn creates_nested_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::open(&nested).unwrap();
        store.set("myMatches", "[]").unwrap();
        assert!(nested.join("myMatches.json").exists());
    }
}
