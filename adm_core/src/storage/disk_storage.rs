use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::storage::Storage;
use crate::types::types::TransferError;

/// Disk-backed `Storage` rooted at a base directory.
///
/// Destination paths resolve lexically against the root without touching the
/// filesystem: `.` segments drop, `..` pops and saturates at the root, and
/// absolute inputs are re-rooted. A transfer can never escape the root.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Storage for DiskStorage {
    fn resolve_path(&self, path: &str) -> Result<PathBuf, TransferError> {
        if path.is_empty() {
            return Err(TransferError::InvalidRequest(
                "destination path is empty".into(),
            ));
        }

        let mut resolved = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        if resolved.as_os_str().is_empty() {
            return Err(TransferError::InvalidRequest(format!(
                "destination \"{}\" resolves to the storage root",
                path
            )));
        }

        Ok(self.root.join(resolved))
    }

    async fn unlink(&self, path: &Path) -> Result<(), TransferError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TransferError::Disk(e)),
        }
    }

    async fn make_directories(&self, path: &Path) -> Result<(), TransferError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(TransferError::Disk)
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
        // Write to a sibling temp file, then rename over the destination so
        // a partial write is never visible at the final path.
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download");
        let part = path.with_file_name(format!(".{}.{}.part", file_name, Uuid::new_v4()));

        tokio::fs::write(&part, bytes)
            .await
            .map_err(TransferError::Disk)?;
        match tokio::fs::rename(&part, path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(TransferError::Disk(e))
            }
        }
    }
}
