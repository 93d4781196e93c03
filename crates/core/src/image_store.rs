//! Physical storage for uploaded images.
//!
//! [`ImageStore`] is the seam between request handling and wherever image
//! bytes actually live. [`LocalImageStore`] keeps them under a root directory
//! on the local file system, one sub-directory per namespace.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

/// An uploaded file, fully buffered.
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    /// Client-supplied file name, used only to pick an extension.
    pub file_name: Option<String>,
    /// Declared MIME type; picks the extension when the file name has none.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Failed to write image {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Save/delete operations for stored images.
///
/// Paths returned by [`save`](ImageStore::save) are relative to the store and
/// are what gets persisted as an image URL.
pub trait ImageStore: Send + Sync {
    /// Persist `image` under `namespace` and return its stored path.
    fn save(
        &self,
        namespace: &str,
        image: &UploadedImage,
    ) -> impl Future<Output = Result<String, ImageStoreError>> + Send;

    /// Remove a previously stored image. Failures are logged, not returned.
    fn delete(&self, path: &str) -> impl Future<Output = ()> + Send;
}

/// File-system backed [`ImageStore`].
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored path against the root.
    ///
    /// Returns `None` for empty, absolute, or parent-escaping paths.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ImageStore for LocalImageStore {
    async fn save(&self, namespace: &str, image: &UploadedImage) -> Result<String, ImageStoreError> {
        let extension = image
            .file_name
            .as_deref()
            .and_then(extension_of)
            .or_else(|| image.content_type.as_deref().and_then(extension_for_mime));
        let file_name = match extension {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4()),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let stored = format!("{namespace}/{file_name}");

        let dir = self.root.join(namespace);
        let write_err = |source| ImageStoreError::Write {
            path: stored.clone(),
            source,
        };
        tokio::fs::create_dir_all(&dir).await.map_err(write_err)?;
        tokio::fs::write(dir.join(&file_name), &image.data)
            .await
            .map_err(write_err)?;

        tracing::debug!(path = %stored, bytes = image.data.len(), "Stored image");
        Ok(stored)
    }

    async fn delete(&self, path: &str) {
        let Some(full) = self.resolve(path) else {
            tracing::warn!(path, "Refusing to delete image outside the store");
            return;
        };
        match tokio::fs::remove_file(&full).await {
            Ok(()) => tracing::debug!(path, "Deleted image"),
            Err(e) => tracing::warn!(path, error = %e, "Failed to delete image"),
        }
    }
}

/// Lower-cased alphanumeric extension of `file_name`, if it has one.
fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extension for an `image/*` MIME type, e.g. `image/svg+xml` gives `svg`.
fn extension_for_mime(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    if !kind.eq_ignore_ascii_case("image") {
        return None;
    }
    let subtype = subtype.split('+').next()?;
    match subtype.to_ascii_lowercase().as_str() {
        "" => None,
        "jpeg" => Some("jpg".to_string()),
        s if s.chars().all(|c| c.is_ascii_alphanumeric()) => Some(s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, data: &[u8]) -> UploadedImage {
        UploadedImage {
            file_name: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            data: data.to_vec(),
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("photo.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
    }

    #[test]
    fn odd_extensions_are_dropped() {
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("evil.p/ng"), None);
    }

    #[test]
    fn mime_extension_only_for_images() {
        assert_eq!(extension_for_mime("image/png").as_deref(), Some("png"));
        assert_eq!(extension_for_mime("IMAGE/JPEG; q=1").as_deref(), Some("jpg"));
        assert_eq!(extension_for_mime("image/svg+xml").as_deref(), Some("svg"));
        assert_eq!(extension_for_mime("application/octet-stream"), None);
        assert_eq!(extension_for_mime("image/"), None);
        assert_eq!(extension_for_mime("png"), None);
    }

    #[test]
    fn resolve_rejects_escaping_paths() {
        let store = LocalImageStore::new("/srv/uploads");
        assert!(store.resolve("").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("productImages/../../secret").is_none());
        assert_eq!(
            store.resolve("productImages/a.png"),
            Some(PathBuf::from("/srv/uploads/productImages/a.png"))
        );
    }

    #[tokio::test]
    async fn save_writes_under_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let path = store.save("productImages", &image("cat.JPG", b"meow")).await.unwrap();

        assert!(path.starts_with("productImages/"));
        assert!(path.ends_with(".jpg"));
        let written = tokio::fs::read(dir.path().join(&path)).await.unwrap();
        assert_eq!(written, b"meow");
    }

    #[tokio::test]
    async fn save_falls_back_to_content_type_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());
        let upload = UploadedImage {
            file_name: Some("blob".to_string()),
            content_type: Some("image/webp".to_string()),
            data: b"riff".to_vec(),
        };

        let path = store.save("productImages", &upload).await.unwrap();

        assert!(path.ends_with(".webp"));
    }

    #[tokio::test]
    async fn file_name_extension_wins_over_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let path = store.save("productImages", &image("cat.gif", b"gif")).await.unwrap();

        assert!(path.ends_with(".gif"));
    }

    #[tokio::test]
    async fn save_gives_each_upload_its_own_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let a = store.save("productImages", &image("a.png", b"1")).await.unwrap();
        let b = store.save("productImages", &image("a.png", b"2")).await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());
        let path = store.save("productImages", &image("a.png", b"1")).await.unwrap();

        store.delete(&path).await;

        assert!(!dir.path().join(&path).exists());
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        store.delete("productImages/gone.png").await;
        store.delete("").await;
    }
}
