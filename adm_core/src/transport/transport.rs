use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::types::Method;

/// Event emitted by a transport session. For one exchange, the contract is
/// zero or more `Progress` events followed by exactly one terminal event
/// (`Success`, `Failure` or `Aborted`), then nothing.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Bytes received so far, and the total if the server advertised one.
    Progress { loaded: u64, total: Option<u64> },
    /// Terminal: 2xx response, full body received.
    Success { status: u16, body: Vec<u8> },
    /// Terminal: non-2xx status, or 0 for a failure below the HTTP layer.
    Failure { status: u16 },
    /// Terminal: local cancellation took effect before the exchange finished.
    Aborted,
}

/// One network exchange, driven by the manager.
///
/// Implementations watch `cancel` cooperatively: once it fires they emit
/// `Aborted` and stop — unless a terminal event was already sent, in which
/// case the cancellation is simply too late and nothing further is emitted.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn fetch(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        events: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    );
}
