//! Filesystem-backed object store for generated thumbnails.
//!
//! Objects are written under a base directory and served back by the API
//! under a public URL prefix. Writes are atomic (temp file + rename) so a
//! crashed upload never leaves a partially written object at its final key.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use quillpad_core::{Error, ObjectStore, Result};

/// Filesystem object store.
///
/// Keys are relative paths (e.g. `thumbnails/7-trip-plan.png`); the public
/// URL is the configured base joined with the key.
pub struct FilesystemStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemStore {
    /// Create a new filesystem store rooted at `base_path`, serving objects
    /// under `public_base_url`.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self {
            base_path: base_path.into(),
            public_base_url,
        }
    }

    fn full_path(&self, key: &str) -> Result<PathBuf> {
        // Keys are server-derived, but reject traversal anyway.
        let rel = Path::new(key);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::Storage(format!("invalid object key: {}", key)));
        }
        Ok(self.base_path.join(rel))
    }

    /// Validate that the store can write, read, and delete objects.
    ///
    /// Performs a full round-trip test at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String> {
        let full_path = self.full_path(key)?;
        debug!(
            subsystem = "storage",
            op = "put",
            object_key = %key,
            size = data.len(),
            "object_store: write"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "object_store: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "object_store: create failed");
            e
        })?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "object_store: rename failed");
            e
        })?;

        // 0644: readable by the serving process, never executable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_path = self.full_path(key)?;
        Ok(fs::try_exists(full_path).await?)
    }
}

/// Derive an object key for a note thumbnail from the note id and name.
///
/// The name is slugged to lowercase ASCII alphanumerics and dashes so
/// arbitrary display names produce safe, stable keys.
pub fn thumbnail_key(note_id: i64, name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        format!("thumbnails/{}.png", note_id)
    } else {
        format!("thumbnails/{}-{}.png", note_id, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_returns_public_url_and_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path(), "http://localhost:3000/files/");

        let url = store
            .put("thumbnails/7-trip-plan.png", b"png-bytes", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/files/thumbnails/7-trip-plan.png");

        let stored = std::fs::read(dir.path().join("thumbnails/7-trip-plan.png")).unwrap();
        assert_eq!(stored, b"png-bytes");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path(), "http://localhost/files");

        store.put("a.png", b"one", "image/png").await.unwrap();
        store.put("a.png", b"two", "image/png").await.unwrap();

        let stored = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(stored, b"two");
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path(), "http://localhost/files");

        store.put("b.png", b"data", "image/png").await.unwrap();
        assert!(store.exists("b.png").await.unwrap());

        store.delete("b.png").await.unwrap();
        assert!(!store.exists("b.png").await.unwrap());

        // Deleting a missing object is a no-op
        store.delete("b.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path(), "http://localhost/files");

        let err = store.put("../escape.png", b"x", "image/png").await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path(), "http://localhost/files");
        store.validate().await.unwrap();
    }

    #[test]
    fn test_thumbnail_key_slugs_name() {
        assert_eq!(
            thumbnail_key(7, "Trip Plan"),
            "thumbnails/7-trip-plan.png"
        );
        assert_eq!(
            thumbnail_key(12, "Q3 / Budget  (draft)"),
            "thumbnails/12-q3-budget-draft.png"
        );
    }

    #[test]
    fn test_thumbnail_key_empty_slug_falls_back_to_id() {
        assert_eq!(thumbnail_key(3, "!!!"), "thumbnails/3.png");
    }

    #[test]
    fn test_public_base_url_trailing_slash_trimmed() {
        let store = FilesystemStore::new("/tmp/x", "http://host/files///");
        assert_eq!(store.public_base_url, "http://host/files");
    }
}
