//! Directory-backed object store.
//!
//! Uploads are written beneath a single root directory opened through
//! `cap-std`, so the process can never follow a key outside the store
//! root even if key validation were bypassed. Blob I/O runs on the
//! blocking thread pool to keep the async executor responsive.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;

use crate::domain::ports::{ObjectKey, ObjectStore, ObjectStoreError};

/// Filesystem [`ObjectStore`] rooted at a capability-scoped directory.
#[derive(Clone)]
pub struct DirStore {
    root: Arc<Dir>,
}

impl DirStore {
    /// Create a store writing beneath `root`.
    pub fn new(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    async fn run_blocking<T>(
        &self,
        key: &ObjectKey,
        op: impl FnOnce(&Dir, &str) -> Result<T, ObjectStoreError> + Send + 'static,
    ) -> Result<T, ObjectStoreError>
    where
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        let key = key.as_str().to_owned();
        tokio::task::spawn_blocking(move || op(&root, &key))
            .await
            .map_err(|err| ObjectStoreError::io(format!("blocking task failed: {err}")))?
    }
}

fn map_io(key: &str, err: std::io::Error) -> ObjectStoreError {
    if err.kind() == ErrorKind::NotFound {
        ObjectStoreError::not_found(key)
    } else {
        ObjectStoreError::io(err.to_string())
    }
}

#[async_trait]
impl ObjectStore for DirStore {
    async fn put(&self, key: &ObjectKey, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        let bytes = bytes.to_vec();
        self.run_blocking(key, move |root, key| {
            if let Some(parent) = Path::new(key).parent().filter(|p| !p.as_os_str().is_empty())
            {
                root.create_dir_all(parent)
                    .map_err(|err| ObjectStoreError::io(err.to_string()))?;
            }
            root.write(key, &bytes)
                .map_err(|err| ObjectStoreError::io(err.to_string()))
        })
        .await
    }

    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, ObjectStoreError> {
        self.run_blocking(key, move |root, key| {
            root.read(key).map_err(|err| map_io(key, err))
        })
        .await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, ObjectStoreError> {
        self.run_blocking(key, move |root, key| match root.remove_file(key) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ObjectStoreError::io(err.to_string())),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_dir_store;
    use rstest::rstest;

    fn key(raw: &str) -> ObjectKey {
        ObjectKey::new(raw).expect("valid key")
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (store, _guard) = temp_dir_store();
        let key = key("companies/3fa85f64/logo.png");

        store.put(&key, b"png bytes").await.expect("put succeeds");
        let bytes = store.get(&key).await.expect("get succeeds");
        assert_eq!(bytes, b"png bytes");
    }

    #[rstest]
    #[tokio::test]
    async fn put_replaces_existing_objects() {
        let (store, _guard) = temp_dir_store();
        let key = key("products/abc/image");

        store.put(&key, b"first").await.expect("first put");
        store.put(&key, b"second").await.expect("second put");
        assert_eq!(store.get(&key).await.expect("get"), b"second");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let (store, _guard) = temp_dir_store();
        let err = store
            .get(&key("nowhere/nothing"))
            .await
            .expect_err("missing object");
        assert!(matches!(err, ObjectStoreError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_object_existed() {
        let (store, _guard) = temp_dir_store();
        let key = key("guides/sheet.pdf");

        store.put(&key, b"pdf").await.expect("put");
        assert!(store.delete(&key).await.expect("first delete"));
        assert!(!store.delete(&key).await.expect("second delete"));
    }
}
