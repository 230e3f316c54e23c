use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::types::types::TransferError;

/// Backing store for completed transfers.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Canonicalize a caller-supplied destination. Relative segments must be
    /// treated consistently; the result is the path handed back through
    /// `on_success`.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, TransferError>;

    /// Remove the object at `path`. Absence is not an error.
    async fn unlink(&self, path: &Path) -> Result<(), TransferError>;

    /// Create `path` and any missing ancestors.
    async fn make_directories(&self, path: &Path) -> Result<(), TransferError>;

    /// Replace the object at `path` with exactly `bytes`. A partial write
    /// must never be left visible at `path`.
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), TransferError>;
}
