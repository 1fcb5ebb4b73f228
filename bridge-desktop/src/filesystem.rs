//! Local Storage Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileKind, InputStream, InputStreamProvider, Storage, StorageFileInfo},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based storage rooted at a local music directory
///
/// Database URIs are `/`-separated and relative to the music directory;
/// [`map_utf8`](Storage::map_utf8) joins them onto the directory path.
pub struct LocalStorage {
    base: PathBuf,
}

impl LocalStorage {
    /// Create a storage rooted at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The music directory this storage is rooted at
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::NotFound(e.to_string())
        } else {
            BridgeError::Io(e)
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn map_utf8(&self, uri_utf8: &str) -> String {
        let base = self.base.to_string_lossy();
        if uri_utf8.is_empty() {
            return base.into_owned();
        }

        let base = base.trim_end_matches('/');
        format!("{}/{}", base, uri_utf8)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn get_info(&self, uri_utf8: &str) -> Result<StorageFileInfo> {
        let path = self.map_utf8(uri_utf8);
        let metadata = fs::metadata(&path).await.map_err(Self::map_io_error)?;

        let kind = if metadata.is_file() {
            FileKind::Regular
        } else if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };

        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        Ok(StorageFileInfo {
            kind,
            size: metadata.len(),
            mtime,
        })
    }
}

/// Input streams read from the local filesystem
#[derive(Debug, Default)]
pub struct TokioInputStreamProvider;

impl TokioInputStreamProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InputStreamProvider for TokioInputStreamProvider {
    async fn open_ready(&self, uri: &str) -> Result<InputStream> {
        if uri.contains("://") {
            return Err(BridgeError::NotAvailable(format!(
                "remote input stream: {}",
                uri
            )));
        }

        let data = fs::read(uri).await.map_err(LocalStorage::map_io_error)?;
        debug!(path = %uri, size = data.len(), "Opened input stream");
        Ok(InputStream::new(uri, Bytes::from(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir() -> PathBuf {
        env::temp_dir().join(format!("bridge-desktop-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_map_utf8() {
        let storage = LocalStorage::new("/srv/music/");
        assert_eq!(storage.map_utf8("rock/list.m3u"), "/srv/music/rock/list.m3u");
        assert_eq!(storage.map_utf8(""), "/srv/music/");
    }

    #[tokio::test]
    async fn test_exists_and_info() {
        let dir = scratch_dir();
        fs::create_dir_all(dir.join("rock")).await.unwrap();
        fs::write(dir.join("rock/a.mp3"), b"ID3").await.unwrap();

        let storage = LocalStorage::new(&dir);
        assert!(storage.exists(&storage.map_utf8("rock/a.mp3")).await.unwrap());
        assert!(!storage.exists(&storage.map_utf8("rock/b.mp3")).await.unwrap());

        let info = storage.get_info("rock/a.mp3").await.unwrap();
        assert!(info.is_regular());
        assert_eq!(info.size, 3);

        let info = storage.get_info("rock").await.unwrap();
        assert!(info.is_directory());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_info_missing() {
        let storage = LocalStorage::new(scratch_dir());
        let result = storage.get_info("nothing.m3u").await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_ready() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("list.m3u");
        fs::write(&path, b"a.mp3\nb.mp3\n").await.unwrap();

        let provider = TokioInputStreamProvider::new();
        let stream = provider
            .open_ready(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(&stream.data[..], b"a.mp3\nb.mp3\n");

        let remote = provider.open_ready("http://example.com/list.m3u").await;
        assert!(matches!(remote, Err(BridgeError::NotAvailable(_))));

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
