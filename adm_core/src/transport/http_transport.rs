use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::transport::{Transport, TransportEvent};
use crate::types::types::Method;

/// reqwest-backed `Transport`.
///
/// Streams the response body chunk by chunk, emitting a `Progress` event per
/// chunk with the running byte count and the `Content-Length` total when the
/// server sent one. No internal retries — callers resubmit on failure.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        // Tuned HTTP client: connection timeout, TCP optimizations
        Self {
            client: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .tcp_nodelay(true)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Use a caller-configured client instead of the tuned default.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        events: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) {
        let builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body.unwrap_or_default()),
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = events.send(TransportEvent::Aborted).await;
                return;
            }
            response = builder.send() => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::debug!("[http] {} \"{}\" failed: {}", method.as_str(), url, e);
                let _ = events.send(TransportEvent::Failure { status: 0 }).await;
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let _ = events
                .send(TransportEvent::Failure {
                    status: status.as_u16(),
                })
                .await;
            return;
        }

        let total = response.content_length();
        // Pre-size from Content-Length, capped so a bogus header cannot
        // trigger a huge allocation up front.
        let mut received: Vec<u8> =
            Vec::with_capacity(total.unwrap_or(0).min(16 * 1024 * 1024) as usize);
        let mut stream = response.bytes_stream();

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = events.send(TransportEvent::Aborted).await;
                    return;
                }
                chunk = stream.next() => chunk,
            };

            match chunk {
                Some(Ok(chunk)) => {
                    received.extend_from_slice(&chunk);
                    let _ = events
                        .send(TransportEvent::Progress {
                            loaded: received.len() as u64,
                            total,
                        })
                        .await;
                }
                Some(Err(e)) => {
                    log::debug!("[http] stream from \"{}\" failed: {}", url, e);
                    let _ = events.send(TransportEvent::Failure { status: 0 }).await;
                    return;
                }
                None => break,
            }
        }

        let _ = events
            .send(TransportEvent::Success {
                status: status.as_u16(),
                body: received,
            })
            .await;
    }
}
