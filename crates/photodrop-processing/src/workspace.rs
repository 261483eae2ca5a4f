//! Invocation-scoped scratch space.
//!
//! [`WorkingStorage`] owns a uniquely named directory under `<work root>/photodrop`.
//! The directory is removed by [`WorkingStorage::release`] on the normal path, or by
//! `Drop` when an invocation bails out early or panics.

use std::io;
use std::path::{Path, PathBuf};

use photodrop_core::constants::WORK_DIR_NAME;
use tempfile::TempDir;

pub struct WorkingStorage {
    dir: Option<TempDir>,
}

impl WorkingStorage {
    /// Create a fresh directory for one invocation.
    ///
    /// The shared parent is created if missing; concurrent invocations racing to
    /// create it is fine.
    pub async fn acquire(root: &Path, prefix: &str) -> io::Result<Self> {
        let base = root.join(WORK_DIR_NAME);
        tokio::fs::create_dir_all(&base).await?;

        let prefix = format!("{}-", prefix);
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir_in(&base)
        })
        .await
        .map_err(io::Error::other)??;

        tracing::debug!(path = %dir.path().display(), "Working storage acquired");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    /// Location of a file inside the working directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.path().join(file_name)
    }

    pub async fn write(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.file_path(file_name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    pub async fn read(&self, file_name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.file_path(file_name)).await
    }

    /// Remove the directory and everything in it, on a blocking thread.
    pub async fn release(mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        let path = dir.path().to_path_buf();
        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(io::Error::other)??;
        tracing::debug!(path = %path.display(), "Working storage released");
        Ok(())
    }
}

impl Drop for WorkingStorage {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove working storage"
                );
            }
        }
    }
}
