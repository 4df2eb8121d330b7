//! Object store: file copies into the configured storage root, with
//! collision-safe suffixing (`name_1.ext`, `name_2.ext`, ...) per directory.
//!
//! Built on the `object_store` crate rather than hand-rolled filesystem
//! calls, so the same adapter can point at local disk today and an
//! S3-compatible bucket later without changing call sites.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ingest_config::ObjectStoreConfig;
use object_store::local::LocalFileSystem;
use object_store::{ObjectStore as _, PutPayload, path::Path as StorePath};
use tokio::sync::Mutex;

use crate::error::StoreError;

/// File copies into the storage root, rooted at a single configured
/// directory (`LOCAL_ROOT_REPO`).
///
/// Per-directory locks serialize collision-suffix selection: two workers
/// copying into the same destination directory must not race and pick the
/// same `_N` suffix.
#[derive(Clone)]
pub struct ObjectStore {
    inner: Arc<LocalFileSystem>,
    root: String,
    dir_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ObjectStore {
    /// Open the store rooted at `config.root`, creating the directory if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Object`] if the root cannot be created or
    /// opened.
    pub fn open(config: &ObjectStoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.root).map_err(|e| StoreError::InvalidPath(e.to_string()))?;
        let inner = LocalFileSystem::new_with_prefix(&config.root).map_err(StoreError::Object)?;
        Ok(Self { inner: Arc::new(inner), root: config.root.clone(), dir_locks: Arc::new(Mutex::new(HashMap::new())) })
    }

    /// Copy the file at `src` (a path on local disk, not necessarily under
    /// the store root) to `dest` (a path relative to the store root),
    /// resolving a name collision by appending `_1`, `_2`, ... before the
    /// extension. Returns the final relative path actually written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Object`] if the read or write fails.
    pub async fn copy_into(&self, src: &Path, dest: &str) -> Result<String, StoreError> {
        let bytes = tokio::fs::read(src).await.map_err(|e| StoreError::InvalidPath(e.to_string()))?;

        let (dir, stem, ext) = split_relative_path(dest);
        let lock = self.dir_lock(&dir).await;
        let _guard = lock.lock().await;

        let mut candidate = dest.to_string();
        let mut attempt = 0u32;
        loop {
            let store_path = StorePath::parse(&candidate).map_err(|e| StoreError::InvalidPath(e.to_string()))?;
            if self.inner.head(&store_path).await.is_err() {
                self.inner.put(&store_path, PutPayload::from(bytes.clone())).await.map_err(StoreError::Object)?;
                return Ok(candidate);
            }
            attempt += 1;
            candidate = join_relative_path(&dir, &format!("{stem}_{attempt}"), &ext);
        }
    }

    /// Resolve a path relative to the store root into an absolute path.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> String {
        format!("{}/{}", self.root.trim_end_matches('/'), relative.trim_start_matches('/'))
    }

    async fn dir_lock(&self, dir: &str) -> Arc<Mutex<()>> {
        let mut locks = self.dir_locks.lock().await;
        locks.entry(dir.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// Split `relative/dir/name.ext` into `("relative/dir", "name", "ext")`.
fn split_relative_path(path: &str) -> (String, String, String) {
    let (dir, filename) = path.rsplit_once('/').map_or(("", path), |(d, f)| (d, f));
    let (stem, ext) = filename.rsplit_once('.').map_or((filename, String::new()), |(s, e)| (s, format!(".{e}")));
    (dir.to_string(), stem.to_string(), ext)
}

fn join_relative_path(dir: &str, stem: &str, ext: &str) -> String {
    if dir.is_empty() { format!("{stem}{ext}") } else { format!("{dir}/{stem}{ext}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_directory_stem_and_extension() {
        assert_eq!(split_relative_path("tabular/products/file.csv"), ("tabular/products".to_string(), "file".to_string(), ".csv".to_string()));
        assert_eq!(split_relative_path("file"), (String::new(), "file".to_string(), String::new()));
    }

    #[tokio::test]
    async fn copy_into_resolves_name_collisions() {
        let root = tempfile::tempdir().unwrap();
        let config = ObjectStoreConfig { root: root.path().to_string_lossy().to_string() };
        let store = ObjectStore::open(&config).unwrap();

        let src = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(src.path(), b"hello").unwrap();

        let first = store.copy_into(src.path(), "tabular/products/file.csv").await.unwrap();
        assert_eq!(first, "tabular/products/file.csv");

        let second = store.copy_into(src.path(), "tabular/products/file.csv").await.unwrap();
        assert_eq!(second, "tabular/products/file_1.csv");
    }
}
