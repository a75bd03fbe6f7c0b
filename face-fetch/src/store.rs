use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::{FetchConfig, FetchError, FetchResult};

/// Local directory holding one file per fetched photo.
///
/// The path of a photo is derived only from `(user_id, item_id)`, so writing
/// the same photo twice overwrites the same file.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
    extension: String,
}

impl LocalPhotoStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extension: "jpg".to_string(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(&config.download_dir).with_extension(&config.file_extension)
    }

    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{user_id}_{item_id}.{ext}`
    pub fn path_for(&self, user_id: i64, item_id: i64) -> PathBuf {
        self.root
            .join(format!("{}_{}.{}", user_id, item_id, self.extension))
    }

    /// Write `bytes` to the photo's path.
    ///
    /// Each call writes and syncs its own temporary sibling and renames it
    /// into place, so the final path only ever holds a complete file, even
    /// when two writers race on the same photo.
    pub async fn persist(&self, user_id: i64, item_id: i64, bytes: &[u8]) -> FetchResult<PathBuf> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| FetchError::persist_failed(&self.root, e))?;

        let path = self.path_for(user_id, item_id);
        let partial = self.root.join(format!(
            ".{}_{}.{}.{}.part",
            user_id,
            item_id,
            self.extension,
            Uuid::new_v4().simple()
        ));

        if let Err(e) = write_synced(&partial, bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(FetchError::persist_failed(&path, e));
        }

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(FetchError::persist_failed(&path, e));
        }

        sync_dir(&self.root)
            .await
            .map_err(|e| FetchError::persist_failed(&self.root, e))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Make the rename itself durable
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
