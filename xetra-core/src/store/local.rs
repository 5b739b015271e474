//! Directory-backed object store.
//!
//! Layout: `{root}/{key}` where each `/`-separated key segment is a path
//! component, e.g. `{root}/2021-05-08/2021-05-08_BINS_XETR08.csv`.
//!
//! Writes are atomic (write to `{file}.tmp`, rename into place); leftover
//! `.tmp` files are never listed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{ObjectStore, StoreError};

const TMP_SUFFIX: &str = ".tmp";

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    name: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file path, rejecting keys that would escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = || StoreError::InvalidKey(key.to_string());
        if key.is_empty() || key.starts_with('/') || key.contains('\\') {
            return Err(invalid());
        }
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid());
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl ObjectStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        if !self.root.exists() {
            return Ok(keys);
        }
        collect_keys(&self.root, "", &mut keys).map_err(|source| StoreError::Io {
            key: prefix.to_string(),
            source,
        })?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io {
                key: key.to_string(),
                source,
            },
        })
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(TMP_SUFFIX);
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, &bytes).map_err(io_err)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            io_err(e)
        })
    }
}

/// Recursively collect `/`-joined keys for every regular file under `dir`.
fn collect_keys(dir: &Path, base: &str, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let key = if base.is_empty() {
            name.clone()
        } else {
            format!("{base}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            collect_keys(&path, &key, out)?;
        } else if !name.ends_with(TMP_SUFFIX) {
            out.push(key);
        }
    }
    Ok(())
}
