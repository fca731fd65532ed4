//! Native blob store: one JSON file per key

use std::fs;
use std::path::{Path, PathBuf};

use super::BlobStore;
use crate::error::StorageError;

/// Stores each record as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CONFIG_HOME/bonus-runner`, else `~/.config/bonus-runner`, else `./.bonus-runner`
    pub fn default_dir() -> PathBuf {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => match std::env::var("HOME") {
                Ok(home) => PathBuf::from(home).join(".config"),
                Err(_) => return PathBuf::from(".bonus-runner"),
            },
        };
        base.join("bonus-runner")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl BlobStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(&path)(e)),
        }
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(Self::io_err(&self.dir))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob).map_err(Self::io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(Self::io_err(&path))?;
        Ok(())
    }
}
