use std::path::Path;

use async_trait::async_trait;

use crate::types::types::Handle;

/// Receives lifecycle notifications for a submitted transfer.
///
/// The manager calls these on whatever task the transport's events arrive
/// on; implementations must not block. Every method defaults to a no-op, so
/// implementors override only the notifications they care about — an
/// unimplemented method is the "no callback registered" case and its
/// notification is dropped.
///
/// Lifecycle:
/// - `on_progress` fires for every transport progress event, with the
///   percent clamped to [0,100] and monotonic non-decreasing per handle.
/// - `on_success` fires once when the body has been persisted to the
///   resolved destination.
/// - `on_error` fires once with the HTTP status for a non-2xx response,
///   `error_code::NETWORK` for a failure below the HTTP layer, or
///   `error_code::STORAGE` when persisting a successful response failed.
/// - Nothing fires for an abort; the `abort` call already acknowledged it.
#[async_trait]
pub trait TransferObserver: Send + Sync + 'static {
    async fn on_progress(&self, handle: Handle, percent: f64) {
        let _ = (handle, percent);
    }

    async fn on_success(&self, handle: Handle, path: &Path) {
        let _ = (handle, path);
    }

    async fn on_error(&self, handle: Handle, code: u32) {
        let _ = (handle, code);
    }
}
