use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::events::observer::TransferObserver;
use crate::events::percent::percent_complete;
use crate::keepalive::{KeepAlive, KeepAliveGuard};
use crate::storage::storage::Storage;
use crate::transport::transport::{Transport, TransportEvent};
use crate::types::types::{
    error_code, Handle, LifecycleState, Method, TransferError, TransferRequest, TransferStatus,
};

/// Capacity of the per-transfer transport event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Entry in the active table. Holds what `abort` and introspection need; the
/// per-transfer driver task owns the callbacks, body and destination.
struct ActiveTransfer {
    url: String,
    destination: PathBuf,
    cancel: CancellationToken,
    state: LifecycleState,
}

/// Accepts transfer requests, tracks each under a process-unique handle,
/// persists successful response bodies through the storage collaborator and
/// reports progress and outcomes through the observer registered at
/// submission.
///
/// Event delivery for a single handle is strictly sequential: the driver
/// task consumes that handle's transport events in order and stops at the
/// first terminal event, so no callback for a handle ever follows its
/// terminal callback.
pub struct TransferManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn Storage>,
    active: RwLock<HashMap<Handle, ActiveTransfer>>,
    next_handle: AtomicU64,
    keep_alive: KeepAlive,
}

impl TransferManager {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                transport,
                storage,
                active: RwLock::new(HashMap::new()),
                next_handle: AtomicU64::new(0),
                keep_alive: KeepAlive::new(),
            }),
        }
    }

    /// Validate and start a transfer. Returns the handle without waiting for
    /// any network I/O; the exchange runs in the background and reports
    /// through the observer.
    ///
    /// Fails synchronously on an empty URL, a POST without a body, or a
    /// destination the storage collaborator rejects — no handle is allocated
    /// and nothing needs cleaning up.
    pub async fn submit(&self, request: TransferRequest) -> Result<Handle, TransferError> {
        let TransferRequest {
            url,
            method,
            destination,
            body,
            observer,
        } = request;

        if url.is_empty() {
            return Err(TransferError::InvalidRequest("url is empty".into()));
        }
        if method == Method::Post && body.is_none() {
            return Err(TransferError::InvalidRequest(
                "POST requires a body".into(),
            ));
        }

        let destination = self.inner.storage.resolve_path(&destination)?;

        let handle = Handle::from_raw(self.inner.next_handle.fetch_add(1, Ordering::Relaxed));
        let cancel = CancellationToken::new();
        let guard = self.inner.keep_alive.acquire();

        log::info!(
            "[submit] handle={} {} \"{}\" -> {:?}",
            handle,
            method.as_str(),
            url,
            destination
        );

        {
            let mut active = self.inner.active.write().await;
            active.insert(
                handle,
                ActiveTransfer {
                    url: url.clone(),
                    destination: destination.clone(),
                    cancel: cancel.clone(),
                    state: LifecycleState::Pending,
                },
            );
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let transport = Arc::clone(&self.inner.transport);
        tokio::spawn(async move {
            transport.fetch(method, url, body, events_tx, cancel).await;
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(drive_transfer(
            inner,
            handle,
            destination,
            observer,
            events_rx,
            guard,
        ));

        Ok(handle)
    }

    /// Request cancellation of an active transfer. Cancellation is
    /// cooperative — completion arrives later as the transport's abort
    /// event. Unknown or already-terminal handles are silently ignored.
    pub async fn abort(&self, handle: Handle) {
        let active = self.inner.active.read().await;
        match active.get(&handle) {
            Some(entry) => {
                log::info!("[abort] handle={} cancelling", handle);
                entry.cancel.cancel();
            }
            None => log::debug!("[abort] handle={} not active, ignoring", handle),
        }
    }

    /// Lifecycle state of an active transfer, `None` once terminal.
    pub async fn state(&self, handle: Handle) -> Option<LifecycleState> {
        self.inner.active.read().await.get(&handle).map(|t| t.state)
    }

    /// Serializable snapshot of an active transfer, `None` once terminal.
    pub async fn status(&self, handle: Handle) -> Option<TransferStatus> {
        self.inner
            .active
            .read()
            .await
            .get(&handle)
            .map(|t| TransferStatus {
                handle,
                url: t.url.clone(),
                destination: t.destination.clone(),
                state: t.state,
            })
    }

    /// Number of transfers that have not yet reached a terminal state.
    pub async fn active_count(&self) -> usize {
        self.inner.active.read().await.len()
    }

    /// Outstanding keep-alive tokens — one per non-terminal transfer.
    pub fn keep_alive_count(&self) -> usize {
        self.inner.keep_alive.active()
    }

    /// Wait until every submitted transfer has reached a terminal state and
    /// its record has been erased.
    pub async fn wait_idle(&self) {
        self.inner.keep_alive.wait_idle().await;
    }

    /// Cancel everything still in flight and wait for the records to drain.
    pub async fn shutdown(&self) {
        {
            let active = self.inner.active.read().await;
            for entry in active.values() {
                entry.cancel.cancel();
            }
        }
        self.wait_idle().await;
    }
}

enum Outcome {
    Success { body: Vec<u8> },
    Failure { code: u32 },
    Aborted,
}

/// Per-transfer driver: consumes transport events in order, dispatches the
/// observer callbacks, persists on success, then erases the record and
/// releases the keep-alive token. The token travels as an RAII guard so the
/// release happens on every exit path, not only the ones written here.
async fn drive_transfer(
    inner: Arc<ManagerInner>,
    handle: Handle,
    destination: PathBuf,
    observer: Option<Arc<dyn TransferObserver>>,
    mut events: mpsc::Receiver<TransportEvent>,
    guard: KeepAliveGuard,
) {
    if let Some(entry) = inner.active.write().await.get_mut(&handle) {
        entry.state = LifecycleState::InFlight;
    }

    let mut last_percent: f64 = 0.0;

    let outcome = loop {
        match events.recv().await {
            Some(TransportEvent::Progress { loaded, total }) => {
                // Reported percent never regresses for a handle.
                let percent = percent_complete(loaded, total).max(last_percent);
                last_percent = percent;
                if let Some(observer) = &observer {
                    observer.on_progress(handle, percent).await;
                }
            }
            Some(TransportEvent::Success { status, body }) => {
                log::info!(
                    "[transfer] handle={} status={} received {} bytes",
                    handle,
                    status,
                    body.len()
                );
                break Outcome::Success { body };
            }
            Some(TransportEvent::Failure { status }) => {
                log::info!("[transfer] handle={} failed with code {}", handle, status);
                break Outcome::Failure {
                    code: status as u32,
                };
            }
            Some(TransportEvent::Aborted) => {
                log::debug!("[transfer] handle={} aborted", handle);
                break Outcome::Aborted;
            }
            // Transport dropped its sender without a terminal event; treat
            // it as a failure below the HTTP layer so the record drains.
            None => {
                break Outcome::Failure {
                    code: error_code::NETWORK,
                }
            }
        }
    };

    // Stop listening before dispatching the terminal outcome; anything a
    // misbehaving transport emits from here on is dropped.
    drop(events);

    match outcome {
        Outcome::Success { body } => match persist(&*inner.storage, &destination, &body).await {
            Ok(()) => {
                if let Some(observer) = &observer {
                    observer.on_success(handle, &destination).await;
                }
            }
            Err(e) => {
                log::error!(
                    "[transfer] handle={} storage failure at {:?}: {}",
                    handle,
                    destination,
                    e
                );
                if let Some(observer) = &observer {
                    observer.on_error(handle, error_code::STORAGE).await;
                }
            }
        },
        Outcome::Failure { code } => {
            if let Some(observer) = &observer {
                observer.on_error(handle, code).await;
            }
        }
        Outcome::Aborted => {}
    }

    // Erase the record before releasing the keep-alive token so an idle
    // manager always has an empty active table.
    inner.active.write().await.remove(&handle);
    drop(guard);
}

/// Success-path persistence: remove any previous object at the destination,
/// create missing parent directories, then atomically replace the file.
async fn persist(
    storage: &dyn Storage,
    destination: &Path,
    body: &[u8],
) -> Result<(), TransferError> {
    storage.unlink(destination).await?;
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            storage.make_directories(parent).await?;
        }
    }
    storage.write_file(destination, body).await
}
