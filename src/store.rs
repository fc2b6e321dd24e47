//! Where page content comes from and goes back to.

use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
}

/// Hash content for change detection.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// A loaded page: its HTML and the hash of what was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub html: String,
    pub hash: u64,
}

/// Storage for one page of HTML content.
pub trait ContentStore {
    /// Human-readable location for messages.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Loaded, StoreError>;

    /// Save `html`, returning the hash of what was written.
    fn save(&self, html: &str) -> Result<u64, StoreError>;

    /// Hash of the current stored content, `None` if it cannot be read.
    fn current_hash(&self) -> Option<u64>;
}

/// Content kept in a local file.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    path: PathBuf,
}

impl FileContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentStore for FileContentStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    /// A missing file loads as an empty page.
    fn load(&self) -> Result<Loaded, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "content file missing, starting empty");
                Vec::new()
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let hash = content_hash(&bytes);
        let html = String::from_utf8(bytes).map_err(|_| StoreError::Encoding {
            path: self.path.clone(),
        })?;
        Ok(Loaded { html, hash })
    }

    fn save(&self, html: &str) -> Result<u64, StoreError> {
        fs::write(&self.path, html).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), bytes = html.len(), "content saved");
        Ok(content_hash(html.as_bytes()))
    }

    fn current_hash(&self) -> Option<u64> {
        match fs::read(&self.path) {
            Ok(bytes) => Some(content_hash(&bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Some(content_hash(&[])),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().expect("tempdir");
        let store = FileContentStore::new(dir.path().join("about.html"));
        let loaded = store.load().expect("load");
        assert_eq!(loaded.html, "");
        assert_eq!(Some(loaded.hash), store.current_hash());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().expect("tempdir");
        let store = FileContentStore::new(dir.path().join("about.html"));
        let hash = store.save("<strong>hi</strong>").expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded.html, "<strong>hi</strong>");
        assert_eq!(loaded.hash, hash);
        assert_eq!(store.current_hash(), Some(hash));
    }

    #[test]
    fn test_external_change_changes_hash() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("about.html");
        let store = FileContentStore::new(&path);
        let hash = store.save("a").expect("save");
        fs::write(&path, "b").expect("write");
        assert_ne!(store.current_hash(), Some(hash));
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("about.html");
        fs::write(&path, [0xff, 0xfe]).expect("write");
        let store = FileContentStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Encoding { .. })));
    }
}
